use std::sync::Arc;

use axum::{body::Body, http::Request, response::Response, Router};
use http_body_util::BodyExt;
use tower::ServiceExt;
use user_service::{server, types::Environment};
use user_storage::{store::MemoryStore, user::UserStorage};

/// Users table name used by the tests
pub const TEST_USERS_TABLE: &str = "test-users";

/// Date the fake store stamps into `createdAt`
pub const TEST_CREATED_ON: &str = "2024-05-01";

/// Setup test tracing
pub fn setup_test_env() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init()
        .ok();
}

/// Router wired to an in-memory store
pub struct TestSetup {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub user_storage: Arc<UserStorage>,
}

impl TestSetup {
    pub fn new() -> Self {
        Self::with_environment(Environment::Development)
    }

    pub fn with_environment(environment: Environment) -> Self {
        setup_test_env();

        let store = Arc::new(MemoryStore::new().with_created_on(TEST_CREATED_ON));
        let user_storage = Arc::new(UserStorage::new(
            store.clone(),
            TEST_USERS_TABLE.to_string(),
        ));
        let router = server::router(environment, user_storage.clone());

        Self {
            router,
            store,
            user_storage,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    pub async fn send_json(
        &self,
        method: &str,
        route: &str,
        payload: &serde_json::Value,
        transaction_id: &str,
    ) -> Response {
        let request = Request::builder()
            .uri(route)
            .method(method)
            .header("Content-Type", "application/json")
            .header("x-request-id", transaction_id)
            .header("X-Forwarded-For", "203.0.113.7, 10.0.0.1")
            .body(Body::from(payload.to_string()))
            .unwrap();

        self.send(request).await
    }

    pub async fn send_get_request(&self, route: &str) -> Response {
        let request = Request::builder()
            .uri(route)
            .method("GET")
            .body(Body::empty())
            .unwrap();

        self.send(request).await
    }
}

/// Parse response body to JSON
pub async fn parse_response_body(response: Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}
