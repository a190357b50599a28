//! Runtime configuration.
//!
//! Every knob has a default and can be set through a `MAILNET_*` environment
//! variable. The CLI applies its own flags on top of [`Config::from_env`].

use std::env;

use chrono::Duration;

use crate::error::{Error, Result};

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .map(|value| matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

fn env_i64(key: &str, default: i64) -> i64 {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<i64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

fn env_f64(key: &str, default: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .unwrap_or(default)
}

/// Records handed to the thread pool at once during extraction.
pub const DEFAULT_CHUNK_SIZE: usize = 25_000;

/// Configuration shared by the extraction and scoring stages.
#[derive(Debug, Clone)]
pub struct Config {
    /// Worker threads for the rayon pool.
    pub threads: usize,
    /// Messages extracted per parallel chunk.
    pub chunk_size: usize,
    /// Width of one time bucket, in hours.
    pub bucket_hours: i64,
    /// Normalize series values by their key count before comparing.
    pub filtered: bool,
    /// Threshold of the windowed similarity.
    pub lambda: f64,
    /// Values at or below this are dropped before windowed similarity.
    pub lower_bound: f64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            threads: env_usize("MAILNET_THREADS", num_cpus::get()),
            chunk_size: env_usize("MAILNET_CHUNK_SIZE", DEFAULT_CHUNK_SIZE),
            bucket_hours: env_i64("MAILNET_BUCKET_HOURS", 1),
            filtered: env_bool("MAILNET_FILTERED", true),
            lambda: env_f64("MAILNET_LAMBDA", 0.5),
            lower_bound: env_f64("MAILNET_LOWER_BOUND", 0.0),
        }
    }

    /// Bucket width as a duration; errors when the hour count is out of range.
    pub fn bucket_width(&self) -> Result<Duration> {
        Duration::try_hours(self.bucket_hours).ok_or_else(|| {
            Error::invalid_argument(format!(
                "bucket width of {} hours is out of range",
                self.bucket_hours
            ))
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
