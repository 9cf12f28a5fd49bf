// src/api/http/handlers.rs
// Liveness probe, debug echo and the JSON 404

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use crate::api::error::{ApiError, ApiResult, IntoApiErrorOption};
use crate::api::types::{HealthResponse, TestMessageRequest, TestMessageResponse};
use crate::state::AppState;

/// Health check handler
pub async fn health_handler(State(app_state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        message: "Memory Lane backend is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model: app_state.model.clone(),
        timestamp: Utc::now(),
    })
}

/// Debug echo: confirms what the backend received.
pub async fn test_message_handler(
    payload: Result<Json<TestMessageRequest>, JsonRejection>,
) -> ApiResult<Json<TestMessageResponse>> {
    let Json(request) = payload?;
    let message = request.message.ok_or_bad_request("Please include a message.")?;

    info!(length = message.len(), "Test message received: {}", message);

    Ok(Json(TestMessageResponse {
        echo: format!("You said: \"{message}\""),
        received: message,
        status: "Message captured successfully".to_string(),
        timestamp: Utc::now(),
    }))
}

pub async fn fallback_handler() -> ApiError {
    ApiError::not_found("That page doesn't exist.")
}
