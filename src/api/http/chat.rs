// src/api/http/chat.rs

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::sync::Arc;
use tracing::info;

use crate::api::error::{require_text, ApiResult};
use crate::api::types::{ChatRequest, ChatResponse};
use crate::state::AppState;

/// Render the optional context for the prompt.
fn context_text(context: Option<serde_json::Value>) -> Option<String> {
    match context? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

pub async fn rest_chat_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResult<Json<ChatResponse>> {
    let Json(request) = payload?;
    let message = require_text(request.message, "message")?;
    let context = context_text(request.context);

    info!(length = message.len(), has_context = context.is_some(), "REST chat request");

    let envelope = app_state
        .assembler
        .chat(&message, context.as_deref())
        .await?;

    Ok(Json(ChatResponse {
        response: envelope.generated_text,
        timestamp: envelope.timestamp,
    }))
}
