//! # API Error Types
//!
//! Two layers of failure reach a client:
//!
//! - **Business outcomes** ([`ExchangeError`] other than `Internal`) are
//!   answered with HTTP 200 and the protocol envelope
//!   `{success: false, message, errors, data: null}`. Counterpart systems
//!   parse that envelope, never the status code.
//! - **Transport faults** ([`AppError`]) use a proper status code and the
//!   [`ErrorBody`] shape: unparseable JSON, malformed multipart, bodies over
//!   the transport limit, and internal faults. Internal detail is logged
//!   and never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use exh_exchange::ExchangeError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Structured JSON body for transport-level errors.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "BAD_REQUEST").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Transport-level error. Implements [`IntoResponse`].
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request body could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Request body exceeds the transport limit (413).
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        if matches!(&self, Self::Internal(_)) {
            tracing::error!(error = %self, "internal server error");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

// ── Protocol envelope ────────────────────────────────────────────────

/// Response envelope shared by every protocol endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
    /// One line per problem; empty on success.
    pub errors: Vec<String>,
    /// Operation output; `null` on failure.
    #[schema(value_type = Object)]
    pub data: serde_json::Value,
}

impl ApiResponse {
    /// Successful envelope around `data`.
    pub fn ok<T: Serialize>(message: impl Into<String>, data: &T) -> Result<Self, AppError> {
        let data = serde_json::to_value(data)
            .map_err(|e| AppError::Internal(format!("serialization error: {e}")))?;
        Ok(Self {
            success: true,
            message: message.into(),
            errors: Vec::new(),
            data,
        })
    }

    /// Failed envelope for a business rejection.
    pub fn rejected(err: &ExchangeError) -> Self {
        Self {
            success: false,
            message: err.to_string(),
            errors: err.errors(),
            data: serde_json::Value::Null,
        }
    }
}

/// Turn an operation result into the envelope.
///
/// Business rejections become `success: false` with 200; internal faults
/// become a 500 [`AppError`].
pub fn respond<T: Serialize>(
    result: Result<T, ExchangeError>,
    message: &str,
) -> Result<Json<ApiResponse>, AppError> {
    match result {
        Ok(data) => ApiResponse::ok(message, &data).map(Json),
        Err(err) if err.is_internal() => Err(AppError::Internal(err.to_string())),
        Err(err) => {
            tracing::info!(code = err.code(), error = %err, "request rejected");
            Ok(Json(ApiResponse::rejected(&err)))
        }
    }
}
