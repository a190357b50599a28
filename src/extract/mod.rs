//! Email-to-edge extraction.
//!
//! - `header`: pulls From/To/Date out of one raw message
//! - `edges`: fans messages out into a sender→recipient edge list
//! - `stats`: counts of kept and dropped records

pub mod edges;
pub mod header;
pub mod stats;

pub use edges::{Edge, EdgeListBuilder, build, build_with_stats};
pub use header::{HeaderError, MessageHeaders, extract, extract_headers};
pub use stats::ExtractStats;
