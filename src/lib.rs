//! Email communication network extraction and time-series scoring.
//!
//! The pipeline turns a corpus of raw messages into a directed
//! sender → recipient edge list, derives per-address activity series from it
//! and scores vertex pairs by how alike their activity is over time.
//!
//! - [`extract`]: From/To/Date header extraction and edge-list building
//! - [`dataset`]: corpus CSV reader and edge-list CSV writer/reader
//! - [`series`]: activity series, ratio similarity, blocked Pearson correlation
//! - [`graph`]: `petgraph`-backed communication graph, components, GEXF export
//! - [`scoring`]: parallel pairwise scoring of linked vertices
//! - [`config`]: environment-driven settings

pub mod config;
pub mod dataset;
pub mod error;
pub mod extract;
pub mod graph;
pub mod scoring;
pub mod series;

pub use config::Config;
pub use error::{Error, Result};
pub use extract::{Edge, EdgeListBuilder, ExtractStats, MessageHeaders};
pub use graph::CommGraph;
pub use series::TimeSeries;

use env_logger::Env;
use std::sync::Once;

static LOGGER: Once = Once::new();

/// Initialise `env_logger` once; `RUST_LOG` overrides the `info` default.
pub fn init_logger() {
    LOGGER.call_once(|| {
        env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    });
}
