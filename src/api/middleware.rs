//! Request pipeline middleware.

use std::any::Any;
use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
    Router,
};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{error, warn};

use crate::config::Mode;
use crate::error::AppError;
use crate::metrics;

use super::response::error_response;

/// Security headers added to every response that doesn't already set them.
const SECURITY_HEADERS: [(&str, &str); 12] = [
    (
        "content-security-policy",
        "default-src 'self';base-uri 'self';font-src 'self' https: data:;\
         form-action 'self';frame-ancestors 'self';img-src 'self' data:;\
         object-src 'none';script-src 'self';script-src-attr 'none';\
         style-src 'self' https: 'unsafe-inline';upgrade-insecure-requests",
    ),
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "same-origin"),
    ("origin-agent-cluster", "?1"),
    ("referrer-policy", "no-referrer"),
    ("strict-transport-security", "max-age=15552000; includeSubDomains"),
    ("x-content-type-options", "nosniff"),
    ("x-dns-prefetch-control", "off"),
    ("x-download-options", "noopen"),
    ("x-frame-options", "SAMEORIGIN"),
    ("x-permitted-cross-domain-policies", "none"),
    ("x-xss-protection", "0"),
];

/// Wrap `router` so every response carries the security headers.
pub fn security_headers<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    SECURITY_HEADERS
        .into_iter()
        .fold(router, |router, (name, value)| {
            router.layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            ))
        })
}

/// Re-render [`AppError`] responses for the active mode.
///
/// Non-operational errors are logged with full detail; clients only ever see
/// what [`error_response`] allows for the mode.
pub async fn global_error_handler(
    State(mode): State<Mode>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let response = next.run(request).await;

    let Some(err) = response.extensions().get::<AppError>().cloned() else {
        return response;
    };

    if err.is_operational() {
        warn!(%method, %path, status = err.status_code().as_u16(), "{}", err.message());
    } else {
        error!(
            %method,
            %path,
            detail = err.detail().unwrap_or_default(),
            "ERROR 💥 {}",
            err.message()
        );
    }

    let mut rendered = error_response(&err, mode).into_response();
    rendered.extensions_mut().insert(err);
    rendered
}

/// Turn a handler panic into a non-operational 500.
pub fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let reason = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    AppError::internal(format!("handler panicked: {reason}")).into_response()
}

/// Count and time every request.
pub async fn track_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "fallback".to_string());
    let method = request.method().clone();

    let response = next.run(request).await;

    metrics::record_http_request(start, method.as_str(), &route, response.status().as_u16());
    response
}
