// src/voice/transcribe.rs
// Server-side speech-to-text for uploaded audio clips

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::AppConfig;

/// Confidence reported for a non-empty transcription; the service gives none.
const RECOGNIZED_CONFIDENCE: f32 = 0.9;

#[derive(Debug, Clone)]
pub struct AudioClip {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl AudioClip {
    pub fn mime(&self) -> String {
        self.content_type.clone().unwrap_or_else(|| {
            mime_guess::from_path(&self.file_name)
                .first_or_octet_stream()
                .to_string()
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcription {
    pub text: String,
    pub confidence: f32,
}

impl Transcription {
    pub fn from_text(text: &str) -> Self {
        let text = text.trim().to_string();
        let confidence = if text.is_empty() { 0.0 } else { RECOGNIZED_CONFIDENCE };
        Self { text, confidence }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    #[error("audio clip is empty")]
    EmptyClip,

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("transcription service returned {status}: {body}")]
    Status { status: u16, body: String },
}

#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, clip: AudioClip) -> Result<Transcription, TranscriptionError>;

    fn name(&self) -> &'static str;
}

/// Used when no transcription service is configured: the view falls back
/// to asking the user to type.
pub struct PlaceholderTranscriber;

#[async_trait]
impl Transcriber for PlaceholderTranscriber {
    async fn transcribe(&self, clip: AudioClip) -> Result<Transcription, TranscriptionError> {
        info!(file = %clip.file_name, bytes = clip.bytes.len(), "No transcription service configured");
        Ok(Transcription::from_text(""))
    }

    fn name(&self) -> &'static str {
        "placeholder"
    }
}

/// OpenAI-compatible `/audio/transcriptions` client.
pub struct HttpTranscriber {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: String,
}

impl HttpTranscriber {
    pub fn new(base_url: &str, api_key: Option<String>, model: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model: model.to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/audio/transcriptions", self.base_url)
    }
}

#[async_trait]
impl Transcriber for HttpTranscriber {
    async fn transcribe(&self, clip: AudioClip) -> Result<Transcription, TranscriptionError> {
        if clip.bytes.is_empty() {
            return Err(TranscriptionError::EmptyClip);
        }

        let mime = clip.mime();
        let size = clip.bytes.len();
        let part = Part::bytes(clip.bytes)
            .file_name(clip.file_name.clone())
            .mime_str(&mime)?;
        let form = Form::new()
            .part("file", part)
            .text("model", self.model.clone());

        let mut request = self.client.post(self.endpoint()).multipart(form);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            warn!(status, "Transcription service rejected clip");
            return Err(TranscriptionError::Status { status, body });
        }

        let parsed: TranscriptionResponse = response.json().await?;
        let transcription = Transcription::from_text(&parsed.text);
        info!(
            file = %clip.file_name,
            bytes = size,
            chars = transcription.text.len(),
            "Audio transcribed"
        );
        Ok(transcription)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Pick the transcriber for this configuration.
pub fn from_config(config: &AppConfig) -> Arc<dyn Transcriber> {
    match &config.transcription_base_url {
        Some(url) => Arc::new(HttpTranscriber::new(
            url,
            config.transcription_api_key.clone(),
            &config.transcription_model,
        )),
        None => Arc::new(PlaceholderTranscriber),
    }
}
