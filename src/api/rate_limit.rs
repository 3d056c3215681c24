//! Fixed-window per-client rate limiting for `/api` routes.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use dashmap::DashMap;
use serde_json::json;
use tracing::warn;

use crate::config::Config;
use crate::metrics;

/// Message sent with a 429.
pub const RATE_LIMIT_MESSAGE: &str = "Too many requests from this IP, please try again in an hour!";

const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    hits: u32,
}

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    /// Request may proceed.
    Allowed {
        /// Requests left in the current window.
        remaining: u32,
    },
    /// Request must be rejected.
    Limited {
        /// Time until the window resets.
        retry_after: Duration,
    },
}

/// Counts requests per client key within a fixed window.
#[derive(Debug)]
pub struct RateLimiter {
    max: u32,
    window: Duration,
    clients: DashMap<String, Window>,
}

impl RateLimiter {
    /// Allow `max` requests per client per `window`.
    pub fn new(max: u32, window: Duration) -> Self {
        Self {
            max,
            window,
            clients: DashMap::new(),
        }
    }

    /// Build from `RATE_LIMIT_MAX` / `RATE_LIMIT_WINDOW_MIN`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.rate_limit_max, config.rate_limit_window())
    }

    /// Requests allowed per window.
    pub fn max(&self) -> u32 {
        self.max
    }

    /// Record a request from `key`.
    pub fn check(&self, key: &str) -> RateDecision {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> RateDecision {
        let mut window = self.clients.entry(key.to_string()).or_insert(Window {
            started: now,
            hits: 0,
        });

        let elapsed = now.saturating_duration_since(window.started);
        if elapsed >= self.window {
            *window = Window {
                started: now,
                hits: 0,
            };
        }

        if window.hits >= self.max {
            return RateDecision::Limited {
                retry_after: self.window.saturating_sub(elapsed),
            };
        }

        window.hits += 1;
        RateDecision::Allowed {
            remaining: self.max - window.hits,
        }
    }

    /// Drop windows that have expired. Returns the number removed.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    fn purge_expired_at(&self, now: Instant) -> usize {
        let before = self.clients.len();
        self.clients
            .retain(|_, w| now.saturating_duration_since(w.started) < self.window);
        before - self.clients.len()
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.clients.len()
    }
}

/// Whether `path` falls under the rate-limited `/api` prefix.
fn is_api_path(path: &str) -> bool {
    path == "/api" || path.starts_with("/api/")
}

/// Client identity: peer address, then first `x-forwarded-for` hop.
fn client_key(request: &Request) -> String {
    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Middleware applying the limiter to `/api` requests.
pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    if !is_api_path(request.uri().path()) {
        return next.run(request).await;
    }

    let key = client_key(&request);
    match limiter.check(&key) {
        RateDecision::Allowed { remaining } => {
            let mut response = next.run(request).await;
            let headers = response.headers_mut();
            headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(limiter.max()));
            headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(remaining));
            response
        }
        RateDecision::Limited { retry_after } => {
            warn!(client = %key, retry_after_secs = retry_after.as_secs(), "Rate limit exceeded");
            metrics::inc_rate_limited();

            (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::RETRY_AFTER, retry_after.as_secs().max(1).to_string())],
                Json(json!({
                    "status": "Error",
                    "message": RATE_LIMIT_MESSAGE,
                })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_max_then_limits() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        let now = Instant::now();

        assert_eq!(limiter.check_at("a", now), RateDecision::Allowed { remaining: 1 });
        assert_eq!(limiter.check_at("a", now), RateDecision::Allowed { remaining: 0 });
        assert_eq!(
            limiter.check_at("a", now + Duration::from_secs(15)),
            RateDecision::Limited {
                retry_after: Duration::from_secs(45)
            }
        );
    }

    #[test]
    fn clients_are_counted_separately() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let now = Instant::now();

        assert!(matches!(limiter.check_at("a", now), RateDecision::Allowed { .. }));
        assert!(matches!(limiter.check_at("b", now), RateDecision::Allowed { .. }));
        assert!(matches!(limiter.check_at("a", now), RateDecision::Limited { .. }));
    }

    #[test]
    fn window_resets_after_expiry() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let now = Instant::now();

        limiter.check_at("a", now);
        assert!(matches!(limiter.check_at("a", now), RateDecision::Limited { .. }));
        assert_eq!(
            limiter.check_at("a", now + Duration::from_secs(60)),
            RateDecision::Allowed { remaining: 0 }
        );
    }

    #[test]
    fn purge_drops_expired_windows() {
        let limiter = RateLimiter::new(5, Duration::from_secs(60));
        let now = Instant::now();

        limiter.check_at("old", now);
        limiter.check_at("new", now + Duration::from_secs(30));

        assert_eq!(limiter.purge_expired_at(now + Duration::from_secs(61)), 1);
        assert_eq!(limiter.tracked_clients(), 1);
    }

    #[test]
    fn only_api_paths_are_limited() {
        assert!(is_api_path("/api"));
        assert!(is_api_path("/api/v1/tours"));
        assert!(!is_api_path("/apiary"));
        assert!(!is_api_path("/health"));
    }
}
