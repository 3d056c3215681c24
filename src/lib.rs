//! Starter scaffold for an HTTP JSON API.
//!
//! The core piece is the query feature translator, which turns REST query
//! strings into document-database primitives:
//!
//! ```text
//! ?sort=-price&ratingsAverage[gte]=4.7&labels[in]=easy,medium&fields=name,price&page=2
//!
//! filter:     {"ratingsAverage[$gte]": "4.7", "labels[$in]": ["easy", "medium"]}
//! sort:       -price
//! projection: name price
//! page:       2 (skip = limit)
//! ```
//!
//! Around it sits a small axum server: configuration from the environment,
//! a middleware pipeline, a uniform JSON envelope for successes and errors,
//! and a placeholder database lifecycle.
//!
//! # Modules
//!
//! - [`query`]: Filter/sort/projection/pagination translation
//! - [`api`]: Routes, middleware and response envelope
//! - [`app`]: Application assembly
//! - [`config`]: Configuration loading from environment
//! - [`database`]: Database connection lifecycle
//! - [`error`]: Unified error types
//! - [`metrics`]: Prometheus metrics
//! - [`utils`]: Utility functions

pub mod api;
pub mod app;
pub mod config;
pub mod database;
pub mod error;
pub mod metrics;
pub mod query;
pub mod utils;

pub use config::Config;
pub use error::{AppError, Result, ServerError};
pub use query::ApiFeatures;
