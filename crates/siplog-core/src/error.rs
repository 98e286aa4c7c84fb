use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Malformed batch: {0}")]
    MalformedBatch(String),

    #[error("Redaction failed for entry {index}: {reason}")]
    RedactionFailure { index: usize, reason: String },

    #[error("Batch cancelled")]
    Cancelled,

    #[error("Batch deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for errors caused by the caller's input rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::MalformedBatch(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::MalformedBatch(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
