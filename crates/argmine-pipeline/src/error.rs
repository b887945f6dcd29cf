//! Error types for the pipeline

use thiserror::Error;

/// Errors that abort a pipeline run
///
/// Problems with a single entity (bad span, identifier collision, rejected
/// link) do not abort the run; they are reported in `PipelineReport::failures`.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A scoring collaborator failed; the whole batch fails
    #[error("Scoring error: {0}")]
    Scoring(String),

    /// Graph store error
    #[error("Store error: {0}")]
    Store(String),

    /// A scoring call did not finish in time
    #[error("Scoring timeout in {0}")]
    Timeout(&'static str),

    /// The request cannot be processed at all
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The debate resolves to a record with different content
    #[error("Identifier collision: {0}")]
    Collision(String),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for PipelineError {
    fn from(e: serde_json::Error) -> Self {
        PipelineError::JsonParse(e.to_string())
    }
}
