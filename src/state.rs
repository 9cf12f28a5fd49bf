// src/state.rs
// Shared, immutable application state handed to every request handler

use std::sync::Arc;

use crate::{
    assembler::{ResponseAssembler, RetryPolicy},
    config::AppConfig,
    llm::{GeminiClient, RateLimiter, TextGenerator},
    voice::transcribe::{self, Transcriber},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub assembler: Arc<ResponseAssembler>,
    pub transcriber: Arc<dyn Transcriber>,
    /// Model name reported by the health probe
    pub model: String,
}

impl AppState {
    /// Wire explicit collaborators. Tests pass fakes here.
    pub fn new(
        config: AppConfig,
        generator: Arc<dyn TextGenerator>,
        transcriber: Arc<dyn Transcriber>,
    ) -> Self {
        let policy = RetryPolicy::from_config(&config);
        Self {
            model: config.model.clone(),
            config: Arc::new(config),
            assembler: Arc::new(ResponseAssembler::new(generator, policy)),
            transcriber,
        }
    }

    /// Production wiring: Gemini behind the rate limiter, transcriber per config.
    pub fn from_config(config: AppConfig) -> Self {
        let limiter = Arc::new(RateLimiter::per_minute(config.rate_limit_rpm));
        let generator: Arc<dyn TextGenerator> = Arc::new(GeminiClient::new(&config, limiter));
        let transcriber = transcribe::from_config(&config);
        Self::new(config, generator, transcriber)
    }
}
