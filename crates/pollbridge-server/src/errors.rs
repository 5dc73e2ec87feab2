//! Error handling for pollbridge-server
//!
//! Wraps pollbridge-core ExError with server-specific helpers and maps it
//! onto HTTP responses.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use pollbridge_core::errors::{BridgeError, ExError, ExErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a configuration error
pub fn config_error(reason: impl std::fmt::Display) -> ExError {
    ExError::new(ExErrorKind::Config)
        .with_op("load_config")
        .with_message(reason.to_string())
}

/// Create a listener bind error
pub fn bind_error(addr: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op("bind")
        .with_message(format!("Failed to bind {}: {}", addr, err))
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Create an error for a request the caller must fix
pub fn invalid_input(operation: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::InvalidInput)
        .with_op(operation.to_string())
        .with_message(reason.to_string())
}

/// Create an error for a collaborator that is not wired in this process
pub fn unavailable(operation: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::ExternalService)
        .with_op(operation.to_string())
        .with_message(reason.to_string())
}

/// Create an unauthorised error
pub fn unauthorised(operation: &str) -> ExError {
    ExError::new(ExErrorKind::Unauthorised)
        .with_op(operation.to_string())
        .with_message("No authenticated operator")
}

/// HTTP-facing error: plain-text body, status derived from the error kind
#[derive(Debug)]
pub struct ApiError(pub ExError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0.kind() {
            ExErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ExErrorKind::Unauthorised => StatusCode::UNAUTHORIZED,
            ExErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            // The host contract expects 500 for undecodable reply batches
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ExError> for ApiError {
    fn from(err: ExError) -> Self {
        Self(err)
    }
}

impl From<BridgeError> for ApiError {
    fn from(err: BridgeError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = if self.0.message().is_empty() {
            self.0.to_string()
        } else {
            self.0.message().to_string()
        };
        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=UTF-8")],
            body,
        )
            .into_response()
    }
}
