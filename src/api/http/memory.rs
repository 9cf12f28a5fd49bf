// src/api/http/memory.rs

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::sync::Arc;
use tracing::info;

use crate::api::error::ApiResult;
use crate::api::types::{MemoryLaneRequest, MemoryLaneResponse};
use crate::state::AppState;

/// Memory recall. Both fields are optional; an empty request opens a
/// general reminiscence.
pub async fn memory_lane_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<MemoryLaneRequest>, JsonRejection>,
) -> ApiResult<Json<MemoryLaneResponse>> {
    let Json(request) = payload?;

    info!(
        query_len = request.query.as_deref().map(str::len).unwrap_or(0),
        memory_type = request.memory_type.as_deref().unwrap_or("general"),
        "Memory lane request"
    );

    let envelope = app_state
        .assembler
        .memory_lane(request.query.as_deref(), request.memory_type.as_deref())
        .await?;

    Ok(Json(MemoryLaneResponse {
        response: envelope.generated_text,
        suggestions: envelope.suggestions,
        memory_type: envelope.mode_echo,
        timestamp: envelope.timestamp,
    }))
}
