//! Failure rendering for the HTTP boundary.

use crate::assignment::services::{AssignmentError, ErrorCode};
use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Error returned by API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The assignment service rejected the request.
    #[error(transparent)]
    Assignment(#[from] AssignmentError),
    /// The request body or query string could not be decoded.
    #[error("invalid request: {0}")]
    Malformed(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Malformed(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Malformed(rejection.body_text())
    }
}

impl ApiError {
    const fn code(&self) -> ErrorCode {
        match self {
            Self::Assignment(err) => ErrorCode::for_error(err),
            Self::Malformed(_) => ErrorCode::BadRequest,
        }
    }
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    error: ErrorDetail<'a>,
}

#[derive(Serialize)]
struct ErrorDetail<'a> {
    code: &'a str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.code();
        let status =
            StatusCode::from_u16(code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let message = if code == ErrorCode::Internal {
            error!(error = %self, "request failed");
            "internal server error".to_owned()
        } else {
            warn!(code = code.as_str(), error = %self, "request rejected");
            self.to_string()
        };
        let body = ErrorEnvelope {
            error: ErrorDetail {
                code: code.as_str(),
                message,
            },
        };
        (status, Json(body)).into_response()
    }
}
