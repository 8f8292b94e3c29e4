//! Engine error types.
//!
//! Query execution itself never fails: empty data and unmatched filters are
//! reported as successful text results. Errors only arise at the JSON
//! boundary.

use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors raised while decoding queries or encoding results.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The query JSON could not be decoded.
    #[error("failed to decode query: {0}")]
    QueryDecode(#[source] serde_json::Error),

    /// The result could not be encoded as JSON.
    #[error("failed to encode result: {0}")]
    ResultEncode(#[source] serde_json::Error),
}
