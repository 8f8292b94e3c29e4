//! Schema discovery and refinement errors.

use thiserror::Error;

use super::SchemaDescription;

/// Result type for discovery.
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

/// Result type for refinement: failures still carry a usable schema.
pub type RefineResult = Result<SchemaDescription, RefineFailure>;

/// Structural problems with discovery input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryError {
    #[error("input table is empty")]
    EmptyInput,

    #[error("input table has no header columns")]
    MissingHeader,

    #[error("input table has no data rows")]
    NoDataRows,
}

/// Errors from the refinement transport or its response.
#[derive(Error, Debug)]
pub enum RefineError {
    #[error("an API key is required for schema refinement")]
    MissingApiKey,

    #[error("failed to encode refinement payload: {0}")]
    Payload(#[source] serde_json::Error),

    #[error("refinement request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("refinement service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("refinement service error {code}: {message}")]
    Provider { code: i64, message: String },

    #[error("refinement service returned an empty response")]
    EmptyResponse,

    #[error("failed to parse refinement response: {source} (response: {excerpt})")]
    Parse {
        #[source]
        source: serde_json::Error,
        excerpt: String,
    },
}

/// A failed refinement together with the untouched draft.
#[derive(Error, Debug)]
#[error("schema refinement failed: {source}")]
pub struct RefineFailure {
    /// The draft exactly as it was passed in.
    pub draft: SchemaDescription,
    #[source]
    pub source: RefineError,
}

impl RefineFailure {
    pub fn new(draft: SchemaDescription, source: RefineError) -> Self {
        Self { draft, source }
    }

    /// Give up on the error and keep the draft.
    pub fn into_draft(self) -> SchemaDescription {
        self.draft
    }
}
