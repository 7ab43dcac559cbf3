//! Universal error handling for the API
//!
//! Every failure answers with the same `500 {"message": "Error!!!"}` envelope.
//! The cause, and the step at which it happened, only reach the logs.

use aide::OperationOutput;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use schemars::JsonSchema;
use serde::Serialize;
use user_storage::user::UserStorageError;

/// Message returned to clients for every failure
pub const GENERIC_ERROR_MESSAGE: &str = "Error!!!";

/// API error response envelope
#[derive(Debug, Serialize, JsonSchema)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub message: &'static str,
}

/// Application error type
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    step: &'static str,
}

impl AppError {
    /// Create a new application error
    #[must_use]
    pub const fn new(status: StatusCode, step: &'static str) -> Self {
        Self { status, step }
    }

    /// Internal error raised at `step`
    #[must_use]
    pub const fn internal(step: &'static str) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, step)
    }

    /// Identifier of the processing step that failed
    #[must_use]
    pub const fn step(&self) -> &'static str {
        self.step
    }

    /// Status code sent to the client
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::debug!(step = self.step, status = %self.status, "Responding with error");

        (
            self.status,
            Json(ErrorResponse {
                message: GENERIC_ERROR_MESSAGE,
            }),
        )
            .into_response()
    }
}

/// Tags a storage failure with the step it happened at
pub trait ResultExt<T> {
    /// Converts the error into an [`AppError`] for `step`, logging the cause
    ///
    /// # Errors
    ///
    /// Returns the converted error if `self` is an error
    fn at_step(self, step: &'static str) -> Result<T, AppError>;
}

impl<T> ResultExt<T> for Result<T, UserStorageError> {
    fn at_step(self, step: &'static str) -> Result<T, AppError> {
        self.map_err(|err| {
            match &err {
                UserStorageError::UserExists(username) => {
                    tracing::warn!(step, username, "User already exists");
                }
                UserStorageError::Store(source) => {
                    tracing::error!(step, error = %source, "Store error");
                }
                UserStorageError::SerializationError(msg) => {
                    tracing::error!(step, error = %msg, "Stored user could not be parsed");
                }
            }
            AppError::internal(step)
        })
    }
}

impl OperationOutput for AppError {
    type Inner = ErrorResponse;

    fn operation_response(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Option<aide::openapi::Response> {
        Json::<ErrorResponse>::operation_response(ctx, operation)
    }
}
