//! Gateway error types and their HTTP mapping.

use axum::extract::rejection::PathRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::net::SocketAddr;

use deal_index::{LookupError, LookupErrorPayload, LookupErrorType};

use super::config::ConfigError;

/// Stable machine-readable error codes
pub mod codes {
    pub const BAD_REQUEST: &str = "bad_request";
    pub const ROW_OUT_OF_RANGE: &str = "row_out_of_range";
    pub const KEY_NOT_FOUND: &str = "key_not_found";
}

/// Per-request error with HTTP status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: codes::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<LookupError> for ApiError {
    fn from(err: LookupError) -> Self {
        let payload = LookupErrorPayload::from(&err);
        let code = match payload.error_type {
            LookupErrorType::RowOutOfRange => codes::ROW_OUT_OF_RANGE,
            LookupErrorType::KeyNotFound => codes::KEY_NOT_FOUND,
        };
        Self {
            status: StatusCode::NOT_FOUND,
            code,
            message: payload.message,
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self {
            status: rejection.status(),
            code: codes::BAD_REQUEST,
            message: rejection.body_text(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: ErrorDetail<'a>,
}

#[derive(Serialize)]
struct ErrorDetail<'a> {
    code: &'a str,
    message: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: &self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

/// Gateway lifecycle errors
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Server socket bind error
    #[error("cannot bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// Server failed while running
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}
