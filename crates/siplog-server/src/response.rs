//! Error responses
//!
//! Every pipeline failure reaches the caller as a JSON body with a status
//! code that says whose fault it was.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use siplog_core::Error;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// User-level status message
    pub status: String,
    /// Error detail, for debugging
    pub error: String,
    /// Offending entry, for redaction failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<usize>,
}

#[derive(Debug)]
pub struct ApiError(pub Error);

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            Error::MalformedBatch(_) => StatusCode::BAD_REQUEST,
            Error::RedactionFailure { .. } | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Error::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            Error::DeadlineExceeded(_) => StatusCode::REQUEST_TIMEOUT,
        }
    }

    fn status_text(&self) -> &'static str {
        match &self.0 {
            Error::MalformedBatch(_) => "Invalid request.",
            Error::RedactionFailure { .. } => "Redaction failed.",
            Error::Cancelled => "Request cancelled.",
            Error::DeadlineExceeded(_) => "Request timed out.",
            Error::Internal(_) => "Internal error.",
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let entry = match &self.0 {
            Error::RedactionFailure { index, .. } => Some(*index),
            _ => None,
        };
        let body = ErrorResponse {
            status: self.status_text().to_string(),
            error: self.0.to_string(),
            entry,
        };

        (self.status_code(), Json(body)).into_response()
    }
}
