//! Edge list construction.
//!
//! Each message with a sender, at least one recipient and a parseable date
//! fans out into one edge per recipient. Output order is message order, then
//! recipient order within a message. Rejected messages contribute nothing and
//! never abort the batch.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::header::{HeaderError, extract_headers};
use super::stats::ExtractStats;
use crate::error::Result;

/// A directed sender→recipient relationship observed at a point in time.
///
/// Serialized with the `Date,From,To` column names of the edge-list CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    #[serde(rename = "Date")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "From")]
    pub from: String,
    #[serde(rename = "To")]
    pub to: String,
}

impl Edge {
    pub fn new(timestamp: DateTime<Utc>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            timestamp,
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Fan one raw message out into its edges.
pub fn edges_for(raw: &str) -> std::result::Result<Vec<Edge>, HeaderError> {
    let headers = extract_headers(raw)?;
    let from = headers.from;
    let date = headers.date;
    Ok(headers
        .to
        .into_iter()
        .map(|to| Edge::new(date, from.clone(), to))
        .collect())
}

/// Build the edge list of a batch of raw messages.
pub fn build<I, S>(messages: I) -> Vec<Edge>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    build_with_stats(messages).0
}

/// Build the edge list and report how many records were kept or dropped.
pub fn build_with_stats<I, S>(messages: I) -> (Vec<Edge>, ExtractStats)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut edges = Vec::new();
    let mut stats = ExtractStats::default();
    for raw in messages {
        absorb(edges_for(raw.as_ref()), &mut edges, &mut stats);
    }
    (edges, stats)
}

fn absorb(
    result: std::result::Result<Vec<Edge>, HeaderError>,
    edges: &mut Vec<Edge>,
    stats: &mut ExtractStats,
) {
    match result {
        Ok(message_edges) => {
            stats.record_success(message_edges.len());
            edges.extend(message_edges);
        }
        Err(err) => {
            log::debug!("skipping message: {}", err);
            stats.record_failure(&err);
        }
    }
}

/// Chunked parallel edge builder.
///
/// Messages are pulled from a stream `chunk_size` at a time, extracted on a
/// dedicated rayon pool and handed to a sink in input order, so the result
/// is identical to [`build`] while memory stays bounded by one chunk.
pub struct EdgeListBuilder {
    pool: rayon::ThreadPool,
    chunk_size: usize,
}

impl EdgeListBuilder {
    pub fn new(threads: usize, chunk_size: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .build()?;
        Ok(Self {
            pool,
            chunk_size: chunk_size.max(1),
        })
    }

    /// Extract one chunk in parallel, keeping message order.
    pub fn build_chunk<S>(&self, chunk: &[S]) -> (Vec<Edge>, ExtractStats)
    where
        S: AsRef<str> + Sync,
    {
        let results: Vec<_> = self.pool.install(|| {
            chunk
                .par_iter()
                .map(|raw| edges_for(raw.as_ref()))
                .collect()
        });

        let mut edges = Vec::new();
        let mut stats = ExtractStats::default();
        for result in results {
            absorb(result, &mut edges, &mut stats);
        }
        (edges, stats)
    }

    /// Stream messages through the extractor, passing every edge to `sink`.
    ///
    /// Errors from the message stream or the sink are fatal and returned as-is.
    pub fn build_streaming<I, F>(&self, messages: I, mut sink: F) -> Result<ExtractStats>
    where
        I: IntoIterator<Item = Result<String>>,
        F: FnMut(&Edge) -> Result<()>,
    {
        let mut total = ExtractStats::default();
        let mut chunk = Vec::with_capacity(self.chunk_size);
        let mut chunk_index = 0usize;

        let mut messages = messages.into_iter();
        loop {
            chunk.clear();
            for message in messages.by_ref().take(self.chunk_size) {
                chunk.push(message?);
            }
            if chunk.is_empty() {
                break;
            }

            let (edges, stats) = self.build_chunk(&chunk);
            for edge in &edges {
                sink(edge)?;
            }
            chunk_index += 1;
            log::debug!(
                "chunk {}: {} messages, {} edges, {} skipped",
                chunk_index,
                stats.messages,
                stats.edges,
                stats.skipped()
            );
            total.merge(stats);

            if chunk.len() < self.chunk_size {
                break;
            }
        }

        log::info!(
            "extraction complete: {} messages, {} edges, {} skipped",
            total.messages,
            total.edges,
            total.skipped()
        );
        Ok(total)
    }
}
