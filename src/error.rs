use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the pipeline stages.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The source file could not be opened or read.
    #[error("source file {path} is unavailable: {source}")]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input's shape is wrong: inconsistent field counts, not the
    /// expected seven columns, or a field that cannot take its canonical type.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The relational store could not be reached or refused the connection.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// A row insertion failed. The fleet table is left exactly as it was
    /// before the load; no partial extent is ever visible.
    #[error("write failed, table left unchanged: {0}")]
    WriteFailed(String),

    /// The canonical dataset has zero rows; no aggregation is meaningful.
    #[error("no rows to aggregate")]
    EmptyDataset,

    /// A chart artifact could not be written.
    #[error("failed to render {path}: {reason}")]
    RenderFailed { path: PathBuf, reason: String },

    /// A configuration value is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PipelineError>;
