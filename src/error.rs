//! Error types for parameter validation and scenario persistence
//!
//! Computation inside a projection run never fails; degenerate divisions
//! resolve to `None` or a sentinel enum in the summary instead.

use thiserror::Error;

/// Raised by [`crate::params::RawParameters::normalize`] before any month is simulated
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("horizon must be at least one month, got {0}")]
    NonPositiveHorizon(i64),

    #[error("field '{field}' is not numeric: {value:?}")]
    NonNumeric { field: String, value: String },
}

/// Raised by the named-scenario store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("scenario '{name}' not found")]
    NotFound { name: String },

    #[error("scenario name must not be empty")]
    EmptyName,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Raised while writing or re-reading CSV exports
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("export I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("export is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
