//! Standard JSON response envelope.
//!
//! Every response body has the same outer shape:
//!
//! ```text
//! {"success": true,  "message": "...", "payload": {...}}
//! {"success": false, "message": "...", "error": {"status": "...", "message": "..."}}
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::config::Mode;
use crate::error::AppError;
use crate::query::Pagination;

/// Top-level message on every error envelope.
pub const ERROR_MESSAGE: &str = "something went wrong";

/// Message replacing non-operational errors in production.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went very wrong!";

/// Outer response body.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<P> {
    /// Whether the request succeeded.
    pub success: bool,
    /// Short human-readable message.
    pub message: String,
    /// Success payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<P>,
    /// Failure details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

/// Failure details inside the envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    /// `fail` or `error`.
    pub status: String,
    /// Error message.
    pub message: String,
    /// Diagnostic detail, never sent in production.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

/// Payload for a page of records.
#[derive(Debug, Clone, Serialize)]
pub struct PagePayload<T> {
    /// Number of records in `data`.
    pub count: usize,
    /// Records on this page.
    pub data: Vec<T>,
    /// Adjacent pages.
    pub pagination: Pagination,
}

impl<T> PagePayload<T> {
    /// Wrap a page of records.
    pub fn new(data: Vec<T>, pagination: Pagination) -> Self {
        Self {
            count: data.len(),
            data,
            pagination,
        }
    }
}

/// Builder for an enveloped JSON response.
#[derive(Debug, Clone)]
pub struct JsonResponse<P = ()> {
    status_code: StatusCode,
    body: Envelope<P>,
}

impl JsonResponse<()> {
    /// 200 response with no payload.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status_code: StatusCode::OK,
            body: Envelope {
                success: true,
                message: message.into(),
                payload: None,
                error: None,
            },
        }
    }

    /// Failed response with the given error body.
    pub fn failure(status_code: StatusCode, message: impl Into<String>, error: ErrorBody) -> Self {
        Self {
            status_code,
            body: Envelope {
                success: false,
                message: message.into(),
                payload: None,
                error: Some(error),
            },
        }
    }
}

impl<P> JsonResponse<P> {
    /// Override the status code.
    pub fn with_status(mut self, status_code: StatusCode) -> Self {
        self.status_code = status_code;
        self
    }

    /// Attach a success payload.
    pub fn with_payload<T>(self, payload: T) -> JsonResponse<T> {
        JsonResponse {
            status_code: self.status_code,
            body: Envelope {
                success: self.body.success,
                message: self.body.message,
                payload: Some(payload),
                error: self.body.error,
            },
        }
    }

    /// Status code to send.
    pub fn status_code(&self) -> StatusCode {
        self.status_code
    }

    /// Body to send.
    pub fn body(&self) -> &Envelope<P> {
        &self.body
    }
}

impl<P: Serialize> IntoResponse for JsonResponse<P> {
    fn into_response(self) -> Response {
        (self.status_code, Json(self.body)).into_response()
    }
}

/// Format an error for the given mode.
///
/// Production hides non-operational errors behind a generic 500 and never
/// includes diagnostic detail.
pub fn error_response(err: &AppError, mode: Mode) -> JsonResponse {
    if mode.is_production() {
        if !err.is_operational() {
            return JsonResponse::failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                ERROR_MESSAGE,
                ErrorBody {
                    status: "error".to_string(),
                    message: GENERIC_ERROR_MESSAGE.to_string(),
                    stack: None,
                },
            );
        }

        return JsonResponse::failure(
            err.status_code(),
            ERROR_MESSAGE,
            ErrorBody {
                status: err.status().to_string(),
                message: err.message().to_string(),
                stack: None,
            },
        );
    }

    JsonResponse::failure(
        err.status_code(),
        ERROR_MESSAGE,
        ErrorBody {
            status: err.status().to_string(),
            message: err.message().to_string(),
            stack: err.detail().map(str::to_string),
        },
    )
}

/// Renders the production-safe envelope and stashes the error in the response
/// extensions so the global error layer can re-render it for the active mode.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut response = error_response(&self, Mode::Production).into_response();
        response.extensions_mut().insert(self);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::PageRef;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn body_json<P: Serialize>(response: &JsonResponse<P>) -> serde_json::Value {
        serde_json::to_value(response.body()).unwrap()
    }

    #[test]
    fn success_envelope_omits_payload_and_error() {
        let response = JsonResponse::success("Welcome to the API 👋");

        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(
            body_json(&response),
            json!({"success": true, "message": "Welcome to the API 👋"})
        );
    }

    #[test]
    fn page_payload_counts_records() {
        let pagination = Pagination {
            next: Some(PageRef { page: 2, page_size: 1 }),
            prev: None,
        };
        let response = JsonResponse::success("tours")
            .with_status(StatusCode::OK)
            .with_payload(PagePayload::new(vec!["a", "b"], pagination));

        assert_eq!(
            body_json(&response),
            json!({
                "success": true,
                "message": "tours",
                "payload": {
                    "count": 2,
                    "data": ["a", "b"],
                    "pagination": {"next": {"page": 2, "pageSize": 1}},
                },
            })
        );
    }

    #[test]
    fn development_errors_carry_detail() {
        let err = AppError::bad_request("Test error").with_detail("at handler");
        let response = error_response(&err, Mode::Development);

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(&response),
            json!({
                "success": false,
                "message": "something went wrong",
                "error": {"status": "fail", "message": "Test error", "stack": "at handler"},
            })
        );
    }

    #[test]
    fn production_operational_errors_hide_detail() {
        let err = AppError::bad_request("Test error").with_detail("at handler");
        let response = error_response(&err, Mode::Production);

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(&response),
            json!({
                "success": false,
                "message": "something went wrong",
                "error": {"status": "fail", "message": "Test error"},
            })
        );
    }

    #[test]
    fn production_programming_errors_are_generic() {
        let err = AppError::internal("Internal server error");
        let response = error_response(&err, Mode::Production);

        assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(&response),
            json!({
                "success": false,
                "message": "something went wrong",
                "error": {"status": "error", "message": "Something went very wrong!"},
            })
        );
    }

    #[test]
    fn app_error_response_keeps_error_extension() {
        let response = AppError::route_not_found("/missing").into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.extensions().get::<AppError>().is_some());
    }
}
