//! HTTP API handlers.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode, Uri},
    response::IntoResponse,
    Json,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;

use crate::api::rate_limit::RateLimiter;
use crate::api::response::JsonResponse;
use crate::config::{Config, Mode};
use crate::database::DatabaseManager;
use crate::error::AppError;

/// Greeting returned by the placeholder route.
pub const WELCOME_MESSAGE: &str = "Welcome to the API 👋";

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration.
    pub config: Arc<Config>,
    /// Database lifecycle manager.
    pub database: Arc<DatabaseManager>,
    /// Rate limiter for `/api` routes.
    pub rate_limiter: Arc<RateLimiter>,
    /// Prometheus render handle, when a recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new app state.
    pub fn new(config: Config, database: Arc<DatabaseManager>) -> Self {
        let rate_limiter = Arc::new(RateLimiter::from_config(&config));
        Self {
            config: Arc::new(config),
            database,
            rate_limiter,
            metrics: None,
        }
    }

    /// Attach a Prometheus handle for `/metrics`.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Runtime mode.
    pub fn mode(&self) -> Mode {
        self.config.app_env
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: &'static str,
}

/// Readiness check response.
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    /// Whether service is ready.
    pub ready: bool,
    /// Database name.
    pub database: String,
}

/// Placeholder root route.
pub async fn welcome() -> JsonResponse {
    JsonResponse::success(WELCOME_MESSAGE)
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// Readiness check handler - returns 200 once the database is connected, 503 otherwise.
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let is_ready = state.database.is_connected();

    let response = ReadyResponse {
        ready: is_ready,
        database: state.database.database_name().to_string(),
    };

    if is_ready {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}

/// Prometheus scrape endpoint.
pub async fn render_metrics(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let handle = state
        .metrics
        .as_ref()
        .ok_or_else(|| AppError::new("metrics are not enabled", StatusCode::NOT_FOUND))?;

    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    ))
}

/// Catch-all for paths no route or static file matched.
pub async fn not_found(uri: Uri) -> AppError {
    AppError::route_not_found(uri.path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::DatabaseConfig;

    #[test]
    fn state_reports_mode_from_config() {
        let config = Config {
            app_env: Mode::Production,
            ..Config::default()
        };
        let state = AppState::new(config, Arc::new(DatabaseManager::new(DatabaseConfig::default())));

        assert_eq!(state.mode(), Mode::Production);
        assert!(state.metrics.is_none());
        assert_eq!(state.rate_limiter.max(), 100);
    }

    #[tokio::test]
    async fn not_found_names_the_path() {
        let err = not_found(Uri::from_static("/api/v1/missing")).await;
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), "Can't find /api/v1/missing on this server!");
    }
}
