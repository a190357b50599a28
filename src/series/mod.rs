//! Per-vertex activity time series.
//!
//! A [`TimeSeries`] maps a discrete time bucket to an activity count. Keys are
//! sparse: a missing bucket means no activity, never an explicit zero.
//!
//! Series are derived from the edge list by [`activity_series`], which buckets
//! edge timestamps relative to a corpus epoch.

pub mod correlation;
pub mod similarity;

pub use correlation::{BLOCK_SIZE, correlate};
pub use similarity::{SIMILARITY_THRESHOLD, WindowParams, similarity, windowed_similarity};

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::extract::Edge;

/// Sparse activity counts keyed by time bucket, in ascending key order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    points: BTreeMap<i64, f64>,
}

impl TimeSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, bucket: i64) -> Option<f64> {
        self.points.get(&bucket).copied()
    }

    /// Add `amount` to the count of `bucket`.
    pub fn add(&mut self, bucket: i64, amount: f64) {
        *self.points.entry(bucket).or_insert(0.0) += amount;
    }

    /// Number of populated buckets.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = i64> + '_ {
        self.points.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, f64)> + '_ {
        self.points.iter().map(|(k, v)| (*k, *v))
    }

    /// Number of populated buckets strictly inside `(start, stop)`.
    pub fn count_within(&self, start: i64, stop: i64) -> usize {
        self.keys_within(start, stop).count()
    }

    /// Keys strictly inside `(start, stop)`, ascending.
    pub fn keys_within(&self, start: i64, stop: i64) -> impl Iterator<Item = i64> + '_ {
        let range = if start < stop {
            Some(self.points.range(start.saturating_add(1)..stop))
        } else {
            None
        };
        range.into_iter().flatten().map(|(k, _)| *k)
    }

    /// Copy of this series keeping only buckets whose value exceeds `lower_bound`.
    pub fn above(&self, lower_bound: f64) -> TimeSeries {
        self.points
            .iter()
            .filter(|(_, v)| **v > lower_bound)
            .map(|(k, v)| (*k, *v))
            .collect()
    }

    /// Buckets present in both series with both values, ascending.
    pub fn shared<'a>(
        &'a self,
        other: &'a TimeSeries,
    ) -> impl Iterator<Item = (i64, f64, f64)> + 'a {
        self.points
            .iter()
            .filter_map(move |(k, v)| other.points.get(k).map(|w| (*k, *v, *w)))
    }

    /// Like [`TimeSeries::shared`], restricted to buckets strictly inside `(start, stop)`.
    pub fn shared_within<'a>(
        &'a self,
        other: &'a TimeSeries,
        start: i64,
        stop: i64,
    ) -> impl Iterator<Item = (i64, f64, f64)> + 'a {
        self.keys_within(start, stop)
            .filter_map(move |k| Some((k, self.get(k)?, other.get(k)?)))
    }
}

impl FromIterator<(i64, f64)> for TimeSeries {
    fn from_iter<T: IntoIterator<Item = (i64, f64)>>(iter: T) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl<const N: usize> From<[(i64, f64); N]> for TimeSeries {
    fn from(points: [(i64, f64); N]) -> Self {
        points.into_iter().collect()
    }
}

/// Maps timestamps to bucket indices: `floor((ts - epoch) / width)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucketing {
    pub epoch: DateTime<Utc>,
    pub width: Duration,
}

impl Bucketing {
    pub fn new(epoch: DateTime<Utc>, width: Duration) -> Result<Self> {
        if width <= Duration::zero() {
            return Err(Error::invalid_argument(format!(
                "bucket width must be positive, got {width}"
            )));
        }
        Ok(Self { epoch, width })
    }

    /// Hourly buckets starting at the earliest edge, or `None` for no edges.
    pub fn hourly_from(edges: &[Edge]) -> Option<Self> {
        Self::from_earliest(edges, Duration::hours(1))
    }

    /// Buckets of `width` starting at the earliest edge.
    pub fn from_earliest(edges: &[Edge], width: Duration) -> Option<Self> {
        let epoch = edges.iter().map(|e| e.timestamp).min()?;
        Self::new(epoch, width).ok()
    }

    pub fn bucket(&self, timestamp: DateTime<Utc>) -> i64 {
        let offset = (timestamp - self.epoch).num_seconds();
        offset.div_euclid(self.width.num_seconds().max(1))
    }
}

/// Which edge endpoints count as activity for a vertex.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Activity {
    /// Messages the vertex sent.
    Sent,
    /// Messages the vertex received.
    Received,
    /// Both directions.
    #[default]
    Both,
}

/// Build one activity series per address from the edge list.
///
/// Every edge adds one unit to the bucket of its timestamp for each endpoint
/// selected by `activity`. A self-loop counted as [`Activity::Both`] adds two.
pub fn activity_series(
    edges: &[Edge],
    bucketing: &Bucketing,
    activity: Activity,
) -> HashMap<String, TimeSeries> {
    let counts: DashMap<String, HashMap<i64, f64>> = DashMap::new();

    edges.par_iter().for_each(|edge| {
        let bucket = bucketing.bucket(edge.timestamp);
        if matches!(activity, Activity::Sent | Activity::Both) {
            *counts
                .entry(edge.from.clone())
                .or_default()
                .entry(bucket)
                .or_insert(0.0) += 1.0;
        }
        if matches!(activity, Activity::Received | Activity::Both) {
            *counts
                .entry(edge.to.clone())
                .or_default()
                .entry(bucket)
                .or_insert(0.0) += 1.0;
        }
    });

    let series: HashMap<String, TimeSeries> = counts
        .into_iter()
        .map(|(address, buckets)| (address, buckets.into_iter().collect()))
        .collect();

    log::debug!(
        "built {} activity series from {} edges",
        series.len(),
        edges.len()
    );
    series
}
