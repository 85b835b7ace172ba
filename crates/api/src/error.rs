//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::OrderError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// The caller carries no pre-validated identity.
    Unauthorized(&'static str),
    /// Bad request from the client.
    BadRequest(String),
    /// Order use-case error.
    Order(OrderError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.to_string()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Order(err) => order_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn order_error_to_response(err: OrderError) -> (StatusCode, String) {
    match &err {
        OrderError::Validation(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        // transient failures resolve inside the pipeline; whatever reaches
        // this point is a server-side fault, reported without detail
        OrderError::Store(_) | OrderError::Cart(_) | OrderError::Configuration(_) => {
            tracing::error!(error = %err, "internal server error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error. Please try again later.".to_string(),
            )
        }
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        ApiError::Order(err)
    }
}
