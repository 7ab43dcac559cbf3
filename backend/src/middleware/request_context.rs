use axum::{
    extract::{FromRequestParts, Request},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use user_storage::user::RequestContext;
use uuid::Uuid;

use crate::types::AppError;

/// Headers carrying a request id set by API Gateway or an upstream proxy
const REQUEST_ID_HEADERS: [&str; 2] = ["x-amzn-requestid", "x-request-id"];

/// Request context of the current request
///
/// Populated by [`request_context_middleware`]:
/// ```ignore
/// async fn handler(ClientContext(context): ClientContext) -> impl IntoResponse {
///     // context.transaction_id, context.ip
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ClientContext(pub RequestContext);

impl<S> FromRequestParts<S> for ClientContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Self>().cloned().ok_or_else(|| {
            tracing::error!("Request context missing from request extensions");
            AppError::internal("request_context")
        })
    }
}

impl aide::operation::OperationInput for ClientContext {}

/// Resolves the transaction id and client IP of a request and stores them
/// in the request extensions.
///
/// The transaction id is the Lambda request id when running on Lambda, else
/// an upstream request id header, else a fresh UUID.
pub async fn request_context_middleware(mut request: Request, next: Next) -> Response {
    let transaction_id = request
        .extensions()
        .get::<lambda_http::Context>()
        .map(|lambda| lambda.request_id.clone())
        .filter(|id| !id.is_empty())
        .or_else(|| header_request_id(request.headers()))
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let ip = forwarded_for(request.headers());

    tracing::debug!(%transaction_id, ip = ?ip, "Resolved request context");

    request
        .extensions_mut()
        .insert(ClientContext(RequestContext { transaction_id, ip }));

    next.run(request).await
}

fn header_request_id(headers: &HeaderMap) -> Option<String> {
    REQUEST_ID_HEADERS.iter().find_map(|name| {
        headers
            .get(*name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(ToString::to_string)
    })
}

/// First address of `X-Forwarded-For` (header names are case-insensitive)
fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
}
