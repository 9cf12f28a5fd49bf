// src/llm/mod.rs
// Text generation collaborator: trait seam plus the Gemini implementation

pub mod gemini;
pub mod rate_limit;

pub use gemini::GeminiClient;
pub use rate_limit::RateLimiter;

use async_trait::async_trait;

/// Errors from the external generation service. Never shown to end users.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("generation service is not configured: {0}")]
    NotConfigured(String),

    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("generation service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("generation service error: {0}")]
    Api(String),

    #[error("generation service returned no text")]
    EmptyResponse,

    #[error("generation timed out after {0:?}")]
    Timeout(std::time::Duration),
}

impl From<reqwest::Error> for GenerationError {
    /// Request URLs are dropped so credentials never reach the logs.
    fn from(e: reqwest::Error) -> Self {
        GenerationError::Transport(e.without_url())
    }
}

/// One composed prompt in, free text out. No conversation state is carried
/// between calls.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Wait until a call may start (rate limiting). Callers run this outside
    /// any bound they put on `generate`.
    async fn ready(&self) {}

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}
