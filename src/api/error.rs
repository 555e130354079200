//! JSON error responses for the HTTP layer.

use crate::errors::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

/// An error ready to be sent to the client.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: &'static str,
    message: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
    code: u16,
    timestamp: String,
}

impl ApiError {
    /// Creates an error with an explicit status.
    pub fn new(status: StatusCode, error: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            error,
            message: message.into(),
        }
    }

    /// 400 for a body, query or path the extractors could not parse.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BadRequest", message)
    }

    /// The HTTP status this error maps to.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation { message } => {
                Self::new(StatusCode::BAD_REQUEST, "ValidationError", message)
            }
            Error::InvalidAmount { amount } => Self::new(
                StatusCode::BAD_REQUEST,
                "InvalidAmount",
                format!("invalid amount: {amount}"),
            ),
            Error::NotFound { entity, id } => {
                Self::new(StatusCode::NOT_FOUND, "NotFound", format!("{entity} {id} not found"))
            }
            Error::Conflict { message } => Self::new(StatusCode::CONFLICT, "Conflict", message),
            Error::Unauthorized { message } => {
                Self::new(StatusCode::UNAUTHORIZED, "Unauthorized", message)
            }
            Error::Forbidden { message } => Self::new(StatusCode::FORBIDDEN, "Forbidden", message),
            other => {
                // Internal details stay in the logs
                tracing::error!("Request failed: {other}");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "InternalServerError",
                    "Internal server error",
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let payload = ErrorResponse {
            error: self.error,
            message: self.message,
            code: self.status.as_u16(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        };
        (self.status, Json(payload)).into_response()
    }
}

/// Result type returned by handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
