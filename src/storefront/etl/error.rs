use std::path::PathBuf;

use thiserror::Error;

use crate::storefront::etl::model::SourceKind;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, EtlError>;

/// Error type covering the failures that can occur while extracting,
/// consolidating, persisting, or exporting product data.
#[derive(Debug, Error)]
pub enum EtlError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// A single record violated its shape or value constraints.
    #[error("invalid {origin} record: {reason}")]
    Validation { origin: SourceKind, reason: String },

    /// An input source could not be read or decoded.
    #[error("source {path} unavailable: {reason}")]
    SourceUnavailable { path: PathBuf, reason: String },

    /// The consolidated snapshot could not be written.
    #[error("failed to write snapshot {path}: {reason}")]
    SinkWrite { path: PathBuf, reason: String },

    /// No snapshot has been persisted yet.
    #[error("consolidated snapshot not found: {0} (run the pipeline first)")]
    SnapshotNotFound(PathBuf),

    /// The persisted snapshot is malformed or holds an invalid record.
    #[error("malformed snapshot {path}: {reason}")]
    SnapshotParse { path: PathBuf, reason: String },

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

impl EtlError {
    pub(crate) fn validation(origin: SourceKind, reason: impl Into<String>) -> Self {
        EtlError::Validation {
            origin,
            reason: reason.into(),
        }
    }
}
