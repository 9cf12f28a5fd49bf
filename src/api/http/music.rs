// src/api/http/music.rs

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::sync::Arc;
use tracing::info;

use crate::api::error::ApiResult;
use crate::api::types::{SpotifyRequest, SpotifyResponse};
use crate::state::AppState;

pub async fn spotify_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<SpotifyRequest>, JsonRejection>,
) -> ApiResult<Json<SpotifyResponse>> {
    let Json(request) = payload?;

    info!(
        action = request.action.as_deref().unwrap_or("suggest"),
        mood = request.mood.as_deref().unwrap_or("-"),
        "Music request"
    );

    let music = app_state
        .assembler
        .music(
            request.action.as_deref(),
            request.query.as_deref(),
            request.mood.as_deref(),
        )
        .await?;

    Ok(Json(SpotifyResponse {
        response: music.envelope.generated_text,
        suggestions: music.envelope.suggestions,
        playlists: music.playlists.into_iter().map(Into::into).collect(),
        action: music.envelope.mode_echo,
        timestamp: music.envelope.timestamp,
    }))
}
