//! Ratio similarity between two activity series.
//!
//! For every bucket both series populate, the two values are compared as
//! `min / max`, a ratio in `[0, 1]`. Ratios above a threshold count as
//! agreement.
//!
//! # Variants
//!
//! - [`similarity`]: fixed threshold of 0.5. Agreeing buckets add their ratio,
//!   disagreeing buckets *subtract* theirs.
//! - [`windowed_similarity`]: caller-chosen threshold, bucket window and
//!   pre-filter. Disagreeing buckets add nothing.
//!
//! The two variants treat disagreement differently, so scores from
//! one are not comparable with scores from the other.
//!
//! # Normalization
//!
//! With `filtered` set, each series' values are divided by that series' number
//! of populated buckets before comparing, so that a very chatty vertex and a
//! quiet one can still agree. A series with no buckets divides by 1.

use super::TimeSeries;

/// Ratio above which two buckets agree in [`similarity`].
pub const SIMILARITY_THRESHOLD: f64 = 0.5;

fn frequency(key_count: usize, filtered: bool) -> f64 {
    if filtered && key_count > 0 {
        key_count as f64
    } else {
        1.0
    }
}

/// `min / max` of two non-negative values. Two zeros are identical: 1.0.
fn ratio(v1: f64, v2: f64) -> f64 {
    let max = v1.max(v2);
    if max > 0.0 { v1.min(v2) / max } else { 1.0 }
}

/// Similarity of two series over all shared buckets.
///
/// Returns exactly `0.0` when the series share no bucket.
///
/// ```rust
/// use mailnet::series::{TimeSeries, similarity};
///
/// let a = TimeSeries::from([(1, 2.0), (2, 4.0)]);
/// let b = TimeSeries::from([(1, 2.0), (2, 2.0)]);
/// // bucket 1 agrees (+1.0), bucket 2 sits on the threshold (-0.5)
/// assert_eq!(similarity(&a, &b, false), 0.5);
/// ```
pub fn similarity(a: &TimeSeries, b: &TimeSeries, filtered: bool) -> f64 {
    let freq_a = frequency(a.len(), filtered);
    let freq_b = frequency(b.len(), filtered);

    let mut total = 0.0;
    for (_, va, vb) in a.shared(b) {
        let sim = ratio(va / freq_a, vb / freq_b);
        if sim > SIMILARITY_THRESHOLD {
            total += sim;
        } else {
            total -= sim;
        }
    }
    total
}

/// Parameters of [`windowed_similarity`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowParams {
    /// Exclusive lower bucket.
    pub start: i64,
    /// Exclusive upper bucket.
    pub stop: i64,
    /// Agreement threshold on the `min / max` ratio.
    pub lambda: f64,
    /// Buckets whose raw value does not exceed this are ignored.
    pub lower_bound: f64,
    pub filtered: bool,
}

impl WindowParams {
    pub fn new(start: i64, stop: i64) -> Self {
        Self {
            start,
            stop,
            lambda: SIMILARITY_THRESHOLD,
            lower_bound: 0.0,
            filtered: true,
        }
    }
}

/// Similarity restricted to buckets strictly inside `(start, stop)`.
///
/// Both series are first reduced to buckets whose value exceeds
/// `lower_bound`. When filtered, each series is normalized by its number of
/// remaining buckets inside the window. Agreeing buckets add their ratio;
/// the rest contribute `0.0`.
pub fn windowed_similarity(a: &TimeSeries, b: &TimeSeries, params: &WindowParams) -> f64 {
    let a = a.above(params.lower_bound);
    let b = b.above(params.lower_bound);

    let freq_a = frequency(a.count_within(params.start, params.stop), params.filtered);
    let freq_b = frequency(b.count_within(params.start, params.stop), params.filtered);

    let mut total = 0.0;
    for (_, va, vb) in a.shared_within(&b, params.start, params.stop) {
        let sim = ratio(va / freq_a, vb / freq_b);
        if sim > params.lambda {
            total += sim;
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_flips_sign() {
        let a = TimeSeries::from([(1, 2.0), (2, 4.0)]);
        let b = TimeSeries::from([(1, 2.0), (2, 2.0)]);
        assert_eq!(similarity(&a, &b, false), 0.5);
    }

    #[test]
    fn test_self_similarity_counts_keys() {
        let a = TimeSeries::from([(1, 3.0), (5, 1.0), (9, 7.0)]);
        assert_eq!(similarity(&a, &a, false), 3.0);
        assert_eq!(similarity(&a, &a, true), 3.0);
    }

    #[test]
    fn test_disjoint_series_score_zero() {
        let a = TimeSeries::from([(1, 3.0), (2, 1.0)]);
        let b = TimeSeries::from([(3, 3.0), (4, 1.0)]);
        assert_eq!(similarity(&a, &b, false), 0.0);
        assert_eq!(similarity(&a, &b, true), 0.0);
        assert_eq!(similarity(&a, &TimeSeries::new(), true), 0.0);
    }

    #[test]
    fn test_filtered_normalizes_by_key_count() {
        // a has 2 keys, b has 1: a[1]/2 = 1.0, b[1]/1 = 1.0
        let a = TimeSeries::from([(1, 2.0), (2, 8.0)]);
        let b = TimeSeries::from([(1, 1.0)]);
        assert_eq!(similarity(&a, &b, true), 1.0);
        // unfiltered: 1/2 = 0.5, not above threshold
        assert_eq!(similarity(&a, &b, false), -0.5);
    }

    #[test]
    fn test_zero_values_are_identical() {
        let a = TimeSeries::from([(1, 0.0), (2, 1.0)]);
        let b = TimeSeries::from([(1, 0.0), (2, 3.0)]);
        assert_eq!(similarity(&a, &a, false), 2.0);
        // bucket 1 agrees, bucket 2 ratio 1/3 is subtracted
        assert!((similarity(&a, &b, false) - (1.0 - 1.0 / 3.0)).abs() < 1e-12);
    }

    #[test]
    fn test_windowed_ignores_disagreement() {
        let a = TimeSeries::from([(1, 2.0), (2, 4.0)]);
        let b = TimeSeries::from([(1, 2.0), (2, 2.0)]);
        let params = WindowParams {
            filtered: false,
            ..WindowParams::new(0, 10)
        };
        assert_eq!(windowed_similarity(&a, &b, &params), 1.0);
    }

    #[test]
    fn test_windowed_respects_open_interval() {
        let a = TimeSeries::from([(1, 1.0), (2, 1.0), (3, 1.0)]);
        let params = WindowParams {
            filtered: false,
            ..WindowParams::new(1, 3)
        };
        assert_eq!(windowed_similarity(&a, &a, &params), 1.0);
    }

    #[test]
    fn test_windowed_lower_bound_and_lambda() {
        let a = TimeSeries::from([(1, 1.0), (2, 4.0), (3, 3.0)]);
        let b = TimeSeries::from([(1, 1.0), (2, 3.0), (3, 3.0)]);
        let params = WindowParams {
            start: 0,
            stop: 10,
            lambda: 0.8,
            lower_bound: 1.0,
            filtered: false,
        };
        // bucket 1 filtered out; bucket 2 ratio 0.75 <= 0.8; bucket 3 ratio 1.0
        assert_eq!(windowed_similarity(&a, &b, &params), 1.0);
    }

    #[test]
    fn test_windowed_filtered_counts_window_keys() {
        // inside (0, 10): a has 2 keys, b has 1 key (b[20] is outside)
        let a = TimeSeries::from([(1, 2.0), (2, 2.0)]);
        let b = TimeSeries::from([(1, 1.0), (20, 9.0)]);
        let params = WindowParams::new(0, 10);
        assert_eq!(windowed_similarity(&a, &b, &params), 1.0);
    }
}
