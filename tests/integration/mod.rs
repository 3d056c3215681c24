//! Integration tests for the API server.
//!
//! These drive the assembled router in-process with `tower::ServiceExt`, so
//! no socket is bound.

use std::sync::Arc;

use api_starter::api::{AppState, JsonResponse, PagePayload};
use api_starter::app::create_app;
use api_starter::config::{Config, Mode};
use api_starter::database::{DatabaseConfig, DatabaseManager};
use api_starter::{ApiFeatures, AppError};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::routing::get;
use axum::Router;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

/// Build app state for a mode, with no static directory on disk.
fn test_state(mode: Mode) -> AppState {
    let config = Config {
        app_env: mode,
        static_dir: "tests/does-not-exist".to_string(),
        database_test: Some("integration".to_string()),
        ..Config::default()
    };
    let database = Arc::new(DatabaseManager::new(DatabaseConfig::from_config(&config)));
    AppState::new(config, database)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Example list handler the way a consumer route would use the translator.
async fn list_tours(features: ApiFeatures) -> Result<JsonResponse<PagePayload<Value>>, AppError> {
    const TOTAL: u64 = 29;

    let page = features.page_request(10)?;
    let filter = features.filter()?;

    let data = (page.skip()..TOTAL.min(page.skip() + page.limit))
        .map(|i| {
            json!({
                "id": i,
                "filter": filter,
                "sort": features.sort().to_string(),
                "select": features.projection().to_string(),
            })
        })
        .collect();

    Ok(JsonResponse::success("tours").with_payload(PagePayload::new(data, page.pagination(TOTAL))))
}

#[tokio::test]
async fn create_app_serves_welcome_with_security_headers() {
    let state = test_state(Mode::Test);
    let database = state.database.clone();
    let app = create_app(state).await.unwrap();

    assert!(database.is_connected());

    let response = app.oneshot(get_request("/api")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["strict-transport-security"], "max-age=15552000; includeSubDomains");
    assert_eq!(headers["x-ratelimit-limit"], "100");
    assert_eq!(headers["x-ratelimit-remaining"], "99");
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let app = create_app(test_state(Mode::Test)).await.unwrap();

    let request = Request::builder()
        .uri("/api")
        .header(header::ORIGIN, "https://example.com")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn unknown_route_in_development_uses_error_envelope() {
    let app = create_app(test_state(Mode::Development)).await.unwrap();

    let (status, body) = send(app, get_request("/missing/route")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({
            "success": false,
            "message": "something went wrong",
            "error": {"status": "fail", "message": "Can't find /missing/route on this server!"},
        })
    );
}

#[tokio::test]
async fn ready_after_create_app() {
    let app = create_app(test_state(Mode::Test)).await.unwrap();

    let (status, body) = send(app, get_request("/ready")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ready": true, "database": "integration"}));
}

#[tokio::test]
async fn list_route_translates_query_and_paginates() {
    let app = Router::new().route("/api/v1/tours", get(list_tours));

    let (status, body) = send(
        app,
        get_request("/api/v1/tours?page=3&difficulty%5Bnin%5D=hard&sort=-price&select=name"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payload"]["count"], 9);
    assert_eq!(
        body["payload"]["pagination"],
        json!({"prev": {"page": 2, "pageSize": 10}})
    );

    let first = &body["payload"]["data"][0];
    assert_eq!(first["id"], 20);
    assert_eq!(first["filter"], json!({"difficulty[$nin]": ["hard"]}));
    assert_eq!(first["sort"], "-price");
    assert_eq!(first["select"], "name");
}

#[tokio::test]
async fn list_route_reports_next_page_remainder() {
    let app = Router::new().route("/api/v1/tours", get(list_tours));

    let (_, body) = send(app, get_request("/api/v1/tours?page=2")).await;

    assert_eq!(
        body["payload"]["pagination"],
        json!({
            "next": {"page": 3, "pageSize": 9},
            "prev": {"page": 1, "pageSize": 10},
        })
    );
}

#[tokio::test]
async fn invalid_limit_is_rejected() {
    let app = Router::new().route("/api/v1/tours", get(list_tours));

    let (status, body) = send(app, get_request("/api/v1/tours?limit=abc")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("limit"));
}
