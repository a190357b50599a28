//! Tabular input and output.
//!
//! The message corpus is a CSV file with a `message` column holding the raw
//! text of one email per row (other columns are ignored). The edge list is a
//! CSV file with `Date,From,To` columns, one row per (message, recipient).
//!
//! Files ending in `.gz` are decompressed on the fly. Rows are streamed; the
//! corpus is never loaded into memory as a whole.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use serde::Deserialize;

use crate::error::Result;
use crate::extract::Edge;

#[derive(Debug, Deserialize)]
struct MessageRecord {
    message: String,
}

fn open_input(path: &Path) -> Result<Box<dyn Read + Send>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let gzipped = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"));
    if gzipped {
        log::debug!("reading {} through gzip decoder", path.display());
        Ok(Box::new(GzDecoder::new(reader)))
    } else {
        Ok(Box::new(reader))
    }
}

/// Streaming reader over the `message` column of a corpus CSV.
pub struct MessageReader {
    records: csv::DeserializeRecordsIntoIter<Box<dyn Read + Send>, MessageRecord>,
}

impl Iterator for MessageReader {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.records
            .next()
            .map(|record| record.map(|r| r.message).map_err(Into::into))
    }
}

/// Open a corpus CSV for streaming.
pub fn read_messages(path: impl AsRef<Path>) -> Result<MessageReader> {
    let path = path.as_ref();
    log::info!("reading messages from {}", path.display());
    Ok(messages_from_reader(open_input(path)?))
}

/// Stream messages out of any CSV source with a `message` column.
pub fn messages_from_reader(reader: Box<dyn Read + Send>) -> MessageReader {
    let records = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader)
        .into_deserialize();
    MessageReader { records }
}

/// Writes edges as `Date,From,To` rows.
pub struct EdgeWriter<W: Write> {
    writer: csv::Writer<W>,
    written: usize,
}

impl EdgeWriter<BufWriter<File>> {
    /// Create (or truncate) an edge-list file.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::info!("writing edge list to {}", path.display());
        let file = File::create(path)?;
        Ok(Self::from_writer(BufWriter::new(file)))
    }
}

impl<W: Write> EdgeWriter<W> {
    pub fn from_writer(writer: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(writer),
            written: 0,
        }
    }

    pub fn write(&mut self, edge: &Edge) -> Result<()> {
        self.writer.serialize(edge)?;
        self.written += 1;
        Ok(())
    }

    /// Number of edges written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush buffered rows and hand back the inner writer.
    pub fn finish(self) -> Result<W> {
        let written = self.written;
        let inner = self
            .writer
            .into_inner()
            .map_err(|err| std::io::Error::other(err.to_string()))?;
        log::debug!("edge writer finished after {} rows", written);
        Ok(inner)
    }
}

/// Write a whole edge list to `path`.
pub fn write_edges(path: impl AsRef<Path>, edges: &[Edge]) -> Result<()> {
    let mut writer = EdgeWriter::create(path)?;
    for edge in edges {
        writer.write(edge)?;
    }
    writer.finish()?;
    Ok(())
}

/// Load an edge list written by [`EdgeWriter`], preserving row order.
pub fn read_edges(path: impl AsRef<Path>) -> Result<Vec<Edge>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_reader(open_input(path)?);
    let edges = reader
        .deserialize()
        .collect::<std::result::Result<Vec<Edge>, _>>()?;
    log::info!("loaded {} edges from {}", edges.len(), path.display());
    Ok(edges)
}
