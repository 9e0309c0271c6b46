//! Error types for wdsp-cl
//!
//! `Error` covers the classification domain. `ApiError` is the HTTP-facing
//! taxonomy; every variant maps to a 4xx/5xx status and a JSON body of the form
//! `{"error": "<message>", "code": "<CODE>"}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Main error type for wdsp-cl
#[derive(Debug, Error)]
pub enum Error {
    /// Upload bytes are not a decodable image
    #[error("Image decode error: {0}")]
    Decode(String),

    /// Classifier failed while running a single inference
    #[error("Inference error: {0}")]
    Inference(String),

    /// Model or label vocabulary could not be loaded
    #[error("Model error: {0}")]
    Model(String),

    /// Invalid service configuration (including dangling label mappings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// wdsp-common error
    #[error(transparent)]
    Common(#[from] wdsp_common::Error),
}

/// Convenience Result type using wdsp-cl Error
pub type Result<T> = std::result::Result<T, Error>;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request carried no `file` part (400)
    #[error("No file part")]
    MissingFile,

    /// `file` part had an empty filename (400)
    #[error("No selected file")]
    EmptyFilename,

    /// Upload could not be decoded as an image (400)
    #[error("Could not read the uploaded image: {0}")]
    UnreadableImage(String),

    /// Upload exceeded the configured body limit (413)
    #[error("Upload too large: {0}")]
    PayloadTooLarge(String),

    /// Malformed request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::MissingFile => (StatusCode::BAD_REQUEST, "MISSING_FILE"),
            ApiError::EmptyFilename => (StatusCode::BAD_REQUEST, "EMPTY_FILENAME"),
            ApiError::UnreadableImage(_) => (StatusCode::BAD_REQUEST, "UNREADABLE_IMAGE"),
            ApiError::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Decode(msg) => ApiError::UnreadableImage(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let body = Json(json!({
            "error": self.to_string(),
            "code": code,
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = std::result::Result<T, ApiError>;
