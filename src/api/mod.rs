//! HTTP API: routes, middleware pipeline and response envelope.

pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod rate_limit;
pub mod response;
pub mod routes;

pub use handlers::AppState;
pub use rate_limit::RateLimiter;
pub use response::{JsonResponse, PagePayload};
pub use routes::create_router;
