// src/conversation/client.rs
// Typed HTTP client for the REST API, used by the conversation view

use reqwest::multipart::{Form, Part};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::ModeContext;
use crate::api::error::GENERIC_APOLOGY;
use crate::api::types::{
    ChatRequest, ChatResponse, ErrorBody, HealthResponse, MemoryLaneRequest,
    MemoryLaneResponse, SpotifyRequest, SpotifyResponse, VoiceToTextResponse,
};
use crate::voice::transcribe::AudioClip;

/// Longer than the server's generation timeout plus one retry.
const REQUEST_TIMEOUT_SECS: u64 = 40;

const UNREACHABLE_MESSAGE: &str =
    "I can't reach the assistant right now. Please check it is running and try again.";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("backend unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),

    #[error("backend returned {status}: {message}")]
    Server { status: u16, message: String },

    #[error("unexpected response body: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("could not build request: {0}")]
    InvalidRequest(#[source] reqwest::Error),
}

impl ClientError {
    /// Sentence to show the user. Server messages are already user-safe.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Unreachable(_) => UNREACHABLE_MESSAGE.to_string(),
            ClientError::Server { message, .. } if !message.trim().is_empty() => message.clone(),
            _ => GENERIC_APOLOGY.to_string(),
        }
    }
}

/// What the view shows for one submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub suggestions: Vec<String>,
    pub failed: bool,
}

impl Reply {
    fn failed(error: &ClientError) -> Self {
        Self {
            text: error.user_message(),
            suggestions: Vec::new(),
            failed: true,
        }
    }
}

#[derive(Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return response.json::<T>().await.map_err(ClientError::Decode);
        }
        let message = response
            .json::<ErrorBody>()
            .await
            .map(|body| body.error)
            .unwrap_or_default();
        Err(ClientError::Server {
            status: status.as_u16(),
            message,
        })
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ClientError> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(ClientError::Unreachable)?;
        Self::decode(response).await
    }

    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let response = self
            .client
            .get(self.url("health"))
            .send()
            .await
            .map_err(ClientError::Unreachable)?;
        Self::decode(response).await
    }

    pub async fn chat(&self, message: &str) -> Result<ChatResponse, ClientError> {
        let request = ChatRequest {
            message: Some(message.to_string()),
            context: None,
        };
        self.post_json("chat", &request).await
    }

    pub async fn memory_lane(&self, query: &str, memory_type: Option<&str>) -> Result<MemoryLaneResponse, ClientError> {
        let request = MemoryLaneRequest {
            query: Some(query.to_string()).filter(|q| !q.trim().is_empty()),
            memory_type: memory_type.map(str::to_string),
        };
        self.post_json("memory-lane", &request).await
    }

    pub async fn spotify(&self, request: &SpotifyRequest) -> Result<SpotifyResponse, ClientError> {
        self.post_json("spotify", request).await
    }

    pub async fn voice_to_text(&self, clip: AudioClip) -> Result<VoiceToTextResponse, ClientError> {
        let mut part = Part::bytes(clip.bytes).file_name(clip.file_name);
        if let Some(content_type) = &clip.content_type {
            part = part.mime_str(content_type).map_err(ClientError::InvalidRequest)?;
        }
        let form = Form::new().part("audio", part);
        let response = self
            .client
            .post(self.url("voice-to-text"))
            .multipart(form)
            .send()
            .await
            .map_err(ClientError::Unreachable)?;
        Self::decode(response).await
    }

    /// Send text in the given mode; failures become a calm reply.
    pub async fn send(&self, mode: ModeContext, text: &str) -> Reply {
        let result = match mode {
            ModeContext::GeneralChat => self.chat(text).await.map(|r| (r.response, Vec::new())),
            ModeContext::MemoryRecall => self
                .memory_lane(text, None)
                .await
                .map(|r| (r.response, r.suggestions)),
            ModeContext::Music => {
                let request = SpotifyRequest {
                    action: None,
                    query: Some(text.to_string()),
                    mood: None,
                };
                self.spotify(&request).await.map(|r| {
                    let mut suggestions = r.suggestions;
                    suggestions.extend(r.playlists.into_iter().map(|p| format!("Playlist: {}", p.name)));
                    (r.response, suggestions)
                })
            }
        };

        match result {
            Ok((text, suggestions)) => {
                debug!(mode = mode.label(), chars = text.len(), "Reply received");
                Reply {
                    text,
                    suggestions,
                    failed: false,
                }
            }
            Err(e) => {
                warn!(mode = mode.label(), error = %e, "Request failed");
                Reply::failed(&e)
            }
        }
    }
}
