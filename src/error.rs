//! Unified error types for the API server.

use axum::http::StatusCode;
use thiserror::Error;

/// Unified error type for server bootstrap and library operations.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration loaded but failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Database lifecycle error.
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// Query translation error.
    #[error("query error: {0}")]
    Query(#[from] QueryError),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while translating a request query.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The query structure cannot be interpreted, e.g. a non-string
    /// `in`/`nin` operand.
    #[error("malformed query parameter `{field}`: {reason}")]
    Malformed {
        /// Offending query key.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// `page` or `limit` is not a positive integer.
    #[error("invalid pagination parameter `{field}`: expected a positive integer, got `{value}`")]
    InvalidPage {
        /// Either `page` or `limit`.
        field: &'static str,
        /// Raw value received.
        value: String,
    },
}

impl QueryError {
    /// Shorthand for a [`QueryError::Malformed`].
    pub fn malformed(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Database lifecycle errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DatabaseError {
    /// The connection URL template still carries a placeholder with no value.
    #[error("connection url placeholder {placeholder} has no value")]
    UnresolvedPlaceholder {
        /// The placeholder, e.g. `<password>`.
        placeholder: &'static str,
    },

    /// Operation requires an open connection.
    #[error("database {name} is not connected")]
    NotConnected {
        /// Database name.
        name: String,
    },
}

/// Error surfaced to HTTP clients through the JSON error envelope.
///
/// Operational errors are anticipated failures (bad input, unknown route) and
/// are safe to show to clients. Anything else is a programming error and is
/// masked in production.
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct AppError {
    message: String,
    status_code: StatusCode,
    is_operational: bool,
    detail: Option<String>,
}

impl AppError {
    /// Create an operational error with the given status code.
    pub fn new(message: impl Into<String>, status_code: StatusCode) -> Self {
        Self {
            message: message.into(),
            status_code,
            is_operational: true,
            detail: None,
        }
    }

    /// 400 Bad Request.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(message, StatusCode::BAD_REQUEST)
    }

    /// 404 for a path no route or static file matched.
    pub fn route_not_found(path: &str) -> Self {
        Self::new(
            format!("Can't find {path} on this server!"),
            StatusCode::NOT_FOUND,
        )
    }

    /// Non-operational 500 wrapping an unexpected failure.
    pub fn internal(err: impl std::fmt::Debug + std::fmt::Display) -> Self {
        Self {
            message: err.to_string(),
            status_code: StatusCode::INTERNAL_SERVER_ERROR,
            is_operational: false,
            detail: Some(format!("{err:?}")),
        }
    }

    /// Attach diagnostic detail, rendered as `stack` outside production.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Client-facing message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        self.status_code
    }

    /// `"fail"` for 4xx codes, `"error"` otherwise.
    pub fn status(&self) -> &'static str {
        if self.status_code.is_client_error() {
            "fail"
        } else {
            "error"
        }
    }

    /// Whether the error is anticipated and safe to expose.
    pub fn is_operational(&self) -> bool {
        self.is_operational
    }

    /// Diagnostic detail, if any.
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }
}

impl From<QueryError> for AppError {
    fn from(err: QueryError) -> Self {
        crate::metrics::inc_malformed_queries();
        AppError::bad_request(err.to_string())
    }
}

impl From<DatabaseError> for AppError {
    fn from(err: DatabaseError) -> Self {
        AppError::internal(err)
    }
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, ServerError>;
