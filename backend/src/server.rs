use std::sync::Arc;

use aide::openapi::{Info, OpenApi};
use axum::{Extension, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use user_storage::user::UserStorage;

use crate::routes;
use crate::types::Environment;

/// Builds the application router with all dependencies attached
pub fn router(environment: Environment, user_storage: Arc<UserStorage>) -> Router {
    let mut openapi = OpenApi {
        info: Info {
            title: "User Service".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            ..Info::default()
        },
        ..OpenApi::default()
    };

    routes::handler(&environment)
        .finish_api(&mut openapi)
        .layer(Extension(Arc::new(openapi)))
        .layer(Extension(environment))
        .layer(Extension(user_storage))
        .layer(TraceLayer::new_for_http())
}

/// Whether the process was started by the AWS Lambda runtime
#[must_use]
pub fn running_on_lambda() -> bool {
    std::env::var("AWS_LAMBDA_RUNTIME_API").is_ok()
}

/// Starts the server with the given environment and dependencies
///
/// On Lambda the router is driven by the Lambda runtime, one event per
/// request. Anywhere else it is served over HTTP on `$PORT` (default 8001).
///
/// # Errors
///
/// Returns an error if the server fails to start or bind to the port
pub async fn start(environment: Environment, user_storage: Arc<UserStorage>) -> anyhow::Result<()> {
    let router = router(environment, user_storage);

    if running_on_lambda() {
        tracing::info!("Starting User Service on the Lambda runtime");
        return lambda_http::run(router)
            .await
            .map_err(|err| anyhow::anyhow!(err));
    }

    let addr = std::net::SocketAddr::from((
        [0, 0, 0, 0],
        std::env::var("PORT").map_or(Ok(8001), |p| p.parse())?,
    ));

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🔄 User Service started on http://{addr}");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(anyhow::Error::from)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
