//! Error types for model construction and invocation.

use thiserror::Error;

/// Failure to produce a model handle.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The model name was empty or whitespace only.
    #[error("Invalid model name provided.")]
    InvalidArgument,
    /// The backend could not be built.
    #[error("{0}")]
    Initialization(String),
}

/// Failure to obtain an answer for a question.
#[derive(Debug, Error)]
pub enum QueryError {
    /// No handle was available, so no call was attempted.
    #[error("Error: Model initialization failed.")]
    ModelUnavailable,
    /// The model call itself failed.
    #[error("Error retrieving response: {0}")]
    Invocation(String),
}
