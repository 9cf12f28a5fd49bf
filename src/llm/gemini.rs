//! Gemini text generation client
//!
//! Uses the generateContent API with a single user turn per call. No
//! streaming, no tools, no server-side history.

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use super::{GenerationError, RateLimiter, TextGenerator};
use crate::config::AppConfig;

const API_KEY_HEADER: &str = "x-goog-api-key";

pub struct GeminiClient {
    client: HttpClient,
    api_key: Option<String>,
    base_url: String,
    model: String,
    temperature: f32,
    max_output_tokens: u32,
    limiter: Arc<RateLimiter>,
}

impl GeminiClient {
    pub fn new(config: &AppConfig, limiter: Arc<RateLimiter>) -> Self {
        Self {
            client: HttpClient::new(),
            api_key: config.gemini_api_key.clone(),
            base_url: config.gemini_base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
            limiter,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn build_request(&self, prompt: &str) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiTextPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        }
    }

    /// Concatenate the text parts of the first candidate.
    fn extract_text(response: GeminiResponse) -> Result<String, GenerationError> {
        if let Some(error) = response.error {
            return Err(GenerationError::Api(error.message));
        }

        let text: String = response
            .candidates
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(text)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn ready(&self) {
        if self.api_key.is_some() {
            self.limiter.acquire().await;
        }
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| GenerationError::NotConfigured("GEMINI_API_KEY not set".into()))?;

        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, api_key)
            .json(&self.build_request(prompt))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Status { status, body });
        }

        let api_response: GeminiResponse = response.json().await?;
        let text = Self::extract_text(api_response)?;
        debug!(model = %self.model, chars = text.len(), "Gemini response received");
        Ok(text)
    }

    fn name(&self) -> &'static str {
        "Gemini"
    }
}

// ============================================================================
// API Types
// ============================================================================

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiTextPart>,
}

#[derive(Serialize)]
struct GeminiTextPart {
    text: String,
}

#[derive(Serialize)]
struct GeminiGenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    error: Option<GeminiError>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
}

#[derive(Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct GeminiError {
    message: String,
}
