// src/api/http/voice.rs
// Multipart audio upload -> transcription

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::{debug, info};

use crate::api::error::{ApiError, ApiResult, IntoApiError};
use crate::api::types::VoiceToTextResponse;
use crate::state::AppState;
use crate::voice::transcribe::AudioClip;

/// Accepted multipart field names for the recording.
const AUDIO_FIELDS: [&str; 2] = ["audio", "file"];

const UNREADABLE: &str = "The recording could not be read. Please try again.";

const TRANSCRIBE_FAILED: &str =
    "Sorry, I couldn't understand the recording. Please try again, or type your message.";

fn unreadable(e: MultipartError) -> ApiError {
    debug!("Unreadable multipart upload: {}", e);
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::custom(
            StatusCode::PAYLOAD_TOO_LARGE,
            "That recording is too long. Please try a shorter one.",
        )
    } else {
        ApiError::bad_request(UNREADABLE)
    }
}

pub async fn voice_to_text_handler(
    State(app_state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<VoiceToTextResponse>> {
    let mut multipart = multipart.map_err(|e| {
        debug!("Voice upload was not multipart: {}", e);
        ApiError::bad_request("Please attach an audio recording.")
    })?;
    let mut clip = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return Err(unreadable(e)),
        };

        let name = field.name().unwrap_or_default().to_string();
        if !AUDIO_FIELDS.contains(&name.as_str()) {
            continue;
        }

        let file_name = field.file_name().unwrap_or("recording.webm").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(unreadable)?;

        clip = Some(AudioClip {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
        break;
    }

    let clip = clip.ok_or_else(|| ApiError::bad_request("Please attach an audio recording."))?;
    if clip.bytes.is_empty() {
        return Err(ApiError::bad_request("The recording was empty. Please try again."));
    }

    info!(
        file = %clip.file_name,
        bytes = clip.bytes.len(),
        transcriber = app_state.transcriber.name(),
        "Voice upload received"
    );

    let transcription = app_state
        .transcriber
        .transcribe(clip)
        .await
        .into_api_error(TRANSCRIBE_FAILED)?;

    Ok(Json(VoiceToTextResponse {
        text: transcription.text,
        confidence: transcription.confidence,
    }))
}
