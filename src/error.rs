use thiserror::Error;

/// Errors surfaced to callers of the batch pipeline.
///
/// Malformed individual messages never show up here; they are counted and
/// skipped by the extractor. Everything in this enum is fatal to a run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("failed to create thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl Error {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
