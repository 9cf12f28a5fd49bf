// src/api/error.rs
// Centralized error handling for HTTP API responses
// Every body carries a short, calm `error` string; internals are only logged

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::json;
use std::fmt;
use tracing::{debug, error};

use crate::assembler::SafeFailure;

/// Shown for any internal failure that has no mode-specific apology.
pub const GENERIC_APOLOGY: &str = "Sorry, something went wrong on our side. Please try again in a moment.";

/// Standard API error response format
#[derive(Debug)]
pub struct ApiError {
    pub message: String,
    pub status_code: StatusCode,
    pub error_code: Option<String>,
    /// Also sent as `response`, so a view that only reads replies stays calm
    pub apology: bool,
}

impl ApiError {
    /// Create a new internal server error. `message` must already be user-safe.
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: StatusCode::INTERNAL_SERVER_ERROR,
            error_code: Some("INTERNAL_ERROR".to_string()),
            apology: false,
        }
    }

    /// Create a new bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: StatusCode::BAD_REQUEST,
            error_code: Some("BAD_REQUEST".to_string()),
            apology: false,
        }
    }

    /// Create a new not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: StatusCode::NOT_FOUND,
            error_code: Some("NOT_FOUND".to_string()),
            apology: false,
        }
    }

    /// The generation service failed; respond with the mode's apology.
    pub fn apology(failure: SafeFailure) -> Self {
        Self {
            message: failure.message.to_string(),
            status_code: StatusCode::INTERNAL_SERVER_ERROR,
            error_code: Some("GENERATION_UNAVAILABLE".to_string()),
            apology: true,
        }
    }

    /// Create a new custom error with specific status code
    pub fn custom(status_code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code,
            error_code: None,
            apology: false,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response_json = json!({
            "error": self.message,
            "status": self.status_code.as_u16(),
            "timestamp": Utc::now().to_rfc3339(),
        });

        if let Some(error_code) = self.error_code {
            response_json["error_code"] = json!(error_code);
        }
        if self.apology {
            response_json["response"] = json!(self.message);
        }

        (self.status_code, Json(response_json)).into_response()
    }
}

impl From<SafeFailure> for ApiError {
    fn from(failure: SafeFailure) -> Self {
        ApiError::apology(failure)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        debug!("Rejected request body: {}", rejection.body_text());
        ApiError::bad_request("Please send the request as JSON.")
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Extension trait for converting common error types to ApiError
pub trait IntoApiError<T> {
    fn into_api_error(self, message: &str) -> Result<T, ApiError>;
}

impl<T, E> IntoApiError<T> for Result<T, E>
where
    E: std::fmt::Display,
{
    /// Log the underlying error and replace it with `message`.
    fn into_api_error(self, message: &str) -> Result<T, ApiError> {
        self.map_err(|e| {
            error!("{}: {}", message, e);
            ApiError::internal(message)
        })
    }
}

/// Extension trait for Option<T> to create ApiError for None cases
pub trait IntoApiErrorOption<T> {
    fn ok_or_bad_request(self, message: &str) -> Result<T, ApiError>;
}

impl<T> IntoApiErrorOption<T> for Option<T> {
    fn ok_or_bad_request(self, message: &str) -> Result<T, ApiError> {
        self.ok_or_else(|| ApiError::bad_request(message))
    }
}

/// Helper function for missing parameter errors
pub fn missing_param_error(param_name: &str) -> ApiError {
    ApiError::bad_request(format!("Please include a {param_name}."))
}

/// Require a present, non-blank string field.
pub fn require_text(value: Option<String>, param_name: &str) -> ApiResult<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| missing_param_error(param_name))
}
