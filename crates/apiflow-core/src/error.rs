//! Error types for the engine.
//!
//! None of these abort a run: node call failures are folded into the
//! [`crate::ExecutionReport`], snapshot errors leave the live graph untouched.

use apiflow_models::GraphError;
use thiserror::Error;

/// Failure of a single HTTP call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvokeError {
    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Response is not valid JSON: {0}")]
    Decode(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

impl From<reqwest::Error> for InvokeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            InvokeError::Timeout(err.to_string())
        } else {
            InvokeError::Transport(err.to_string())
        }
    }
}

/// A snapshot document that could not be loaded or written.
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Snapshot must be a JSON object")]
    NotAnObject,

    #[error("Snapshot is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Snapshot contains an invalid record: {0}")]
    InvalidRecord(String),

    #[error("Snapshot graph is invalid: {0}")]
    Graph(#[from] GraphError),

    #[error("Snapshot IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of the remote publish side channel.
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("No publish endpoint configured")]
    NotConfigured,

    #[error("Publish request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Publish service returned HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Publish response has no '{0}' field")]
    MissingAddress(String),
}
