//! Error types for the performance monitor.
//!
//! Recording and querying cannot fail; only exporting a report can.

use thiserror::Error;

/// Errors raised by the monitor's own helpers.
///
/// Failures of wrapped operations are never converted into this type; they
/// are handed back to the caller unchanged.
#[derive(Debug, Error)]
pub enum PerfError {
    /// Failed to serialize a report
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for monitor helpers.
pub type PerfResult<T> = Result<T, PerfError>;
