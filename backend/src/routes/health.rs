use aide::axum::IntoApiResponse;
use axum::{Extension, Json};
use schemars::JsonSchema;
use serde::Serialize;

use super::users::MessageResponse;
use crate::types::Environment;

/// Message returned by the index route
pub const SERVER_ON_MESSAGE: &str = "The server is ON!!!";

#[derive(Debug, Serialize, JsonSchema)]
pub struct HealthResponse {
    /// Always `ok` when the service answers
    status: &'static str,
    /// Deployment stage the service runs in
    stage: String,
    /// Current version of the application
    semver: String,
    /// Commit hash of the current build (if available)
    rev: Option<String>,
}

/// Server status
#[allow(clippy::unused_async)]
pub async fn index() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: SERVER_ON_MESSAGE,
    })
}

/// Liveness probe reporting the deployment stage and build version
#[allow(clippy::unused_async)]
pub async fn handler(Extension(environment): Extension<Environment>) -> impl IntoApiResponse {
    Json(HealthResponse {
        status: "ok",
        stage: format!("{environment:?}").to_lowercase(),
        semver: env!("CARGO_PKG_VERSION").to_string(),
        rev: option_env!("GIT_REV").map(ToString::to_string),
    })
}
