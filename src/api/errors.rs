use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::services::progress::ProgressError;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    status: u16,
    kind: &'static str,
    detail: String,
}

#[derive(Debug)]
pub(crate) enum ApiError {
    Unauthorized(&'static str),
    BadRequest(String),
    NotFound(String),
    /// Domain failure with its own machine-readable kind.
    Rejected {
        status: StatusCode,
        kind: &'static str,
        detail: String,
    },
    Internal(String),
}

impl ApiError {
    /// Log the underlying error with context and return an `Internal` variant.
    pub(crate) fn internal(err: impl std::fmt::Display, context: &str) -> Self {
        tracing::error!(error = %err, "{context}");
        Self::Internal(context.to_string())
    }
}

impl From<ProgressError> for ApiError {
    fn from(err: ProgressError) -> Self {
        let status = match &err {
            ProgressError::NotInitialized
            | ProgressError::AlreadySubmitted
            | ProgressError::InvalidReference(_)
            | ProgressError::InvalidOption(_) => StatusCode::BAD_REQUEST,
            ProgressError::NotFound(_) => StatusCode::NOT_FOUND,
            ProgressError::OutlineTooLarge(_)
            | ProgressError::Snapshot(_)
            | ProgressError::Storage(_) => {
                return ApiError::internal(err, "Progress operation failed");
            }
        };

        ApiError::Rejected { status, kind: err.kind(), detail: err.to_string() }
    }
}

fn error_body(status: StatusCode, kind: &'static str, detail: String) -> Response {
    (status, Json(ErrorResponse { status: status.as_u16(), kind, detail })).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized(message) => {
                let mut response =
                    error_body(StatusCode::UNAUTHORIZED, "unauthorized", message.to_string());
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
                response
            }
            ApiError::BadRequest(message) => {
                error_body(StatusCode::BAD_REQUEST, "bad_request", message)
            }
            ApiError::NotFound(message) => error_body(StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Rejected { status, kind, detail } => error_body(status, kind, detail),
            ApiError::Internal(message) => {
                tracing::error!(error = %message, "Internal server error");
                error_body(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
            }
        }
    }
}
