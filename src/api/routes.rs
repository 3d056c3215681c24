//! HTTP API route definitions and middleware stack.

use axum::{
    extract::DefaultBodyLimit, handler::HandlerWithoutStateExt, middleware, routing::get, Router,
};
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use super::handlers::{health, not_found, ready, render_metrics, welcome, AppState};
use super::middleware::{global_error_handler, handle_panic, security_headers, track_metrics};
use super::rate_limit::rate_limit;

/// Create the API router.
///
/// Layers run outermost first: request logging (development only), security
/// headers, CORS, metrics, body limit, rate limiting on `/api`, error
/// formatting, panic recovery, then routing. Unmatched paths fall through to
/// static files and finally a 404.
pub fn create_router(state: AppState) -> Router {
    let mode = state.mode();

    let static_files = ServeDir::new(&state.config.static_dir)
        .call_fallback_on_method_not_allowed(true)
        .fallback(not_found.into_service());

    let router = Router::new()
        // Welcome endpoints
        .route("/", get(welcome))
        .route("/api", get(welcome))
        // Health endpoints
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/metrics", get(render_metrics))
        .fallback_service(static_files)
        .with_state(state.clone())
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn_with_state(mode, global_error_handler))
        .layer(middleware::from_fn_with_state(
            state.rate_limiter.clone(),
            rate_limit,
        ))
        .layer(DefaultBodyLimit::max(state.config.body_limit_bytes))
        .layer(middleware::from_fn(track_metrics))
        .layer(CorsLayer::permissive());

    let router = security_headers(router);

    if mode.is_development() {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}
