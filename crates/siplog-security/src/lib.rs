//! Redaction capability for SIP signaling text
//!
//! The dispatcher only knows the [`Redact`] trait. [`SipRedactor`] is the
//! built-in implementation; anything else (an external anonymizer, a test
//! stub) can be plugged in the same way.

pub mod redactor;

pub use redactor::{RedactionInfo, SipRedactor};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RedactError {
    #[error("message is not valid UTF-8: {0}")]
    InvalidEncoding(#[from] std::str::Utf8Error),

    #[error("message of {size} bytes exceeds the {limit} byte limit")]
    MessageTooLarge { size: usize, limit: usize },

    #[error("{0}")]
    Failed(String),
}

/// Turns one raw signaling message into its redacted form.
///
/// Implementations must be pure and reentrant: the fan-out strategy calls
/// the same instance from many threads at once.
pub trait Redact: Send + Sync {
    fn redact(&self, message: &[u8]) -> Result<Vec<u8>, RedactError>;
}

impl<F> Redact for F
where
    F: Fn(&[u8]) -> Result<Vec<u8>, RedactError> + Send + Sync,
{
    fn redact(&self, message: &[u8]) -> Result<Vec<u8>, RedactError> {
        self(message)
    }
}
