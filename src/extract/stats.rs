//! Extraction statistics tracking.

use serde::Serialize;

use super::header::HeaderError;

/// Counts for one extraction run.
///
/// Dropped records are tallied by the header that rejected them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractStats {
    /// Records seen
    pub messages: usize,
    /// Records that produced at least one edge
    pub extracted: usize,
    /// Edges emitted
    pub edges: usize,
    pub missing_from: usize,
    pub missing_to: usize,
    pub missing_date: usize,
    pub invalid_date: usize,
}

impl ExtractStats {
    /// Merge another ExtractStats into this one by summing all counts.
    pub fn merge(&mut self, other: ExtractStats) {
        self.messages += other.messages;
        self.extracted += other.extracted;
        self.edges += other.edges;
        self.missing_from += other.missing_from;
        self.missing_to += other.missing_to;
        self.missing_date += other.missing_date;
        self.invalid_date += other.invalid_date;
    }

    pub fn skipped(&self) -> usize {
        self.messages - self.extracted
    }

    pub(crate) fn record_success(&mut self, edges: usize) {
        self.messages += 1;
        self.extracted += 1;
        self.edges += edges;
    }

    pub(crate) fn record_failure(&mut self, err: &HeaderError) {
        self.messages += 1;
        match err {
            HeaderError::MissingFrom => self.missing_from += 1,
            HeaderError::MissingTo => self.missing_to += 1,
            HeaderError::MissingDate => self.missing_date += 1,
            HeaderError::InvalidDate { .. } => self.invalid_date += 1,
        }
    }
}
