//! Application error type mapping to HTTP status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use orderline_types::error::{OrderError, SubmitError};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Order body failed validation.
    InvalidPayload(String),
    /// The messaging session is not authenticated.
    NotReady,
    /// The backend failed to deliver; carries its reason verbatim.
    Delivery(String),
}

impl From<SubmitError> for AppError {
    fn from(e: SubmitError) -> Self {
        match e {
            SubmitError::NotReady => AppError::NotReady,
            SubmitError::Invalid(OrderError::InvalidPayload(msg)) => AppError::InvalidPayload(msg),
            SubmitError::Delivery(reason) => AppError::Delivery(reason),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::InvalidPayload(message) => (
                StatusCode::BAD_REQUEST,
                json!({ "success": false, "error": "InvalidPayload", "message": message }),
            ),
            AppError::NotReady => (
                StatusCode::SERVICE_UNAVAILABLE,
                json!({ "success": false, "error": "NotReady" }),
            ),
            AppError::Delivery(reason) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "success": false, "error": reason }),
            ),
        };

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}
