//! Data source error types

use thiserror::Error;

/// Errors that can occur while reading from a document store
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    /// The retry budget was exhausted without a successful round-trip
    #[error("Failed to connect to {target} after {attempts} attempts: {message}")]
    Connection {
        target: String,
        attempts: u32,
        message: String,
    },

    /// The connection string could not be parsed; retrying cannot help
    #[error("Invalid connection string: {0}")]
    InvalidUri(String),

    /// A single attempt failed (network, server selection, cursor error)
    #[error("Transient failure: {0}")]
    Transient(String),
}

impl SourceError {
    /// Whether another attempt may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, SourceError::Transient(_))
    }
}

/// Result type alias for data source operations
pub type SourceResult<T> = Result<T, SourceError>;
