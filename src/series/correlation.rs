//! Blocked Pearson correlation over a bucket window.
//!
//! The buckets both series populate strictly inside `(start, stop)` are taken
//! in ascending order and cut into consecutive blocks of [`BLOCK_SIZE`]. Each
//! block yields a Pearson-style coefficient
//!
//! ```text
//! num = Σxy − Σx·Σy / n
//! den = sqrt((Σx² − (Σx)² / n) · (Σy² − (Σy)² / n))
//! ```
//!
//! where `n` is the number of shared buckets in the *whole* window, not in the
//! block. The result is the sum of the block coefficients, so it is not
//! bounded by `[-1, 1]` and does not reduce to the single-pass Pearson
//! coefficient. Downstream scores depend on this exact aggregate.

use super::TimeSeries;

/// Buckets per correlation block (one day of hourly buckets).
pub const BLOCK_SIZE: usize = 24;

#[derive(Default)]
struct BlockSums {
    x: f64,
    y: f64,
    xx: f64,
    yy: f64,
    xy: f64,
}

impl BlockSums {
    fn push(&mut self, x: f64, y: f64) {
        self.x += x;
        self.y += y;
        self.xx += x * x;
        self.yy += y * y;
        self.xy += x * y;
    }

    fn coefficient(&self, n: f64) -> f64 {
        let numerator = self.xy - self.x * self.y / n;
        let spread = (self.xx - self.x * self.x / n) * (self.yy - self.y * self.y / n);
        // rounding can push a zero spread slightly negative
        if spread <= 0.0 {
            return 0.0;
        }
        let denominator = spread.sqrt();
        if denominator == 0.0 {
            0.0
        } else {
            numerator / denominator
        }
    }
}

/// Sum of blocked Pearson coefficients of `a` and `b` inside `(start, stop)`.
///
/// With `filtered` set, each series is divided by its number of populated
/// buckets inside the window first. Returns exactly `0.0` when the series
/// share no bucket inside the window.
pub fn correlate(a: &TimeSeries, b: &TimeSeries, start: i64, stop: i64, filtered: bool) -> f64 {
    let common: Vec<(i64, f64, f64)> = a.shared_within(b, start, stop).collect();
    if common.is_empty() {
        return 0.0;
    }

    let (freq_a, freq_b) = if filtered {
        (
            a.count_within(start, stop).max(1) as f64,
            b.count_within(start, stop).max(1) as f64,
        )
    } else {
        (1.0, 1.0)
    };
    let n = common.len() as f64;

    common
        .chunks(BLOCK_SIZE)
        .map(|block| {
            let mut sums = BlockSums::default();
            for &(_, x, y) in block {
                sums.push(x / freq_a, y / freq_b);
            }
            sums.coefficient(n)
        })
        .sum()
}
