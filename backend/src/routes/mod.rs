mod docs;
pub mod health;
pub mod users;

use aide::axum::{
    routing::{get, post},
    ApiRouter,
};
use axum::middleware;

use crate::{middleware::request_context_middleware, types::Environment};

/// Creates the router with all handler routes
pub fn handler(environment: &Environment) -> ApiRouter {
    let user_routes = ApiRouter::new()
        .api_route("/users", post(users::create_user).put(users::update_user))
        .api_route("/users/{username}", get(users::get_user))
        .layer(middleware::from_fn(request_context_middleware));

    ApiRouter::new()
        .merge(docs::handler(environment))
        .api_route("/", get(health::index))
        .api_route("/health", get(health::handler))
        .merge(user_routes)
}
