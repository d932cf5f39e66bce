use std::path::PathBuf;
use thiserror::Error;

/// Failures that abort a whole aggregation run.
///
/// Per-row problems never show up here; those are classified as
/// [`crate::record::SkipReason`] and absorbed by the aggregator.
#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("Failed to open log file {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read CSV header: {0}")]
    Header(#[source] csv::Error),

    #[error("Failed to read log file: {0}")]
    Read(#[source] csv::Error),

    #[error("Missing required column '{0}' in CSV header")]
    MissingColumn(String),
}

pub type Result<T> = std::result::Result<T, AnalyzeError>;
