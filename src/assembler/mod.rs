//! Response assembly
//!
//! Turns a classification plus the user's text into one prompt, calls the
//! generation service (bounded timeout, bounded retry) and packages the
//! reply with the category's fixed suggestions. Upstream failures are logged
//! and replaced by a fixed apology; the raw error never leaves this module.

pub mod prompts;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::classifier::{self, ClassificationResult, Mode, Playlist};
use crate::config::AppConfig;
use crate::llm::{GenerationError, TextGenerator};
pub use prompts::PromptInput;

pub const CHAT_APOLOGY: &str =
    "I'm sorry, I'm having a little trouble right now. Let's try again in a moment.";
pub const MEMORY_APOLOGY: &str =
    "I'm sorry, I couldn't look back through our memories just now. Shall we try again in a moment?";
pub const MUSIC_APOLOGY: &str =
    "I'm sorry, I couldn't find the music just now. Let's try again in a little while.";

/// The fixed, non-technical text shown in place of any upstream failure.
pub fn apology_for(mode: Mode) -> &'static str {
    match mode {
        Mode::Chat => CHAT_APOLOGY,
        Mode::MemoryLane => MEMORY_APOLOGY,
        Mode::Music => MUSIC_APOLOGY,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseEnvelope {
    pub generated_text: String,
    pub suggestions: Vec<String>,
    pub mode_echo: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MusicEnvelope {
    #[serde(flatten)]
    pub envelope: ResponseEnvelope,
    pub playlists: Vec<Playlist>,
}

/// A failed assembly. Carries only user-safe text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafeFailure {
    pub mode: Mode,
    pub message: &'static str,
}

impl SafeFailure {
    fn for_mode(mode: Mode) -> Self {
        Self {
            mode,
            message: apology_for(mode),
        }
    }
}

impl std::fmt::Display for SafeFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message)
    }
}

impl std::error::Error for SafeFailure {}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Bound on each attempt
    pub timeout: Duration,
    /// Extra attempts after the first failure
    pub retries: u32,
}

impl RetryPolicy {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            timeout: config.generation_timeout(),
            retries: config.generation_retries,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(12),
            retries: 1,
        }
    }
}

pub struct ResponseAssembler {
    generator: Arc<dyn TextGenerator>,
    policy: RetryPolicy,
}

impl ResponseAssembler {
    pub fn new(generator: Arc<dyn TextGenerator>, policy: RetryPolicy) -> Self {
        Self { generator, policy }
    }

    /// Compose, generate and package one response.
    pub async fn assemble(
        &self,
        classification: &ClassificationResult,
        input: &PromptInput<'_>,
        mode_echo: &str,
    ) -> Result<ResponseEnvelope, SafeFailure> {
        let mode = classification.matched_category.mode();
        let input = PromptInput {
            topic: classification.topic.as_deref().or(input.topic),
            ..*input
        };
        let prompt = prompts::compose(classification.prompt_template, &input);

        info!(
            mode = %mode,
            category = ?classification.matched_category,
            input_chars = input.text.chars().count(),
            "Assembling response"
        );
        debug!(mode = %mode, message = %input.text, "User message");

        let started = Instant::now();
        match self.generate_with_retry(mode, &prompt).await {
            Ok(text) => {
                info!(
                    mode = %mode,
                    output_chars = text.chars().count(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Response assembled"
                );
                Ok(ResponseEnvelope {
                    generated_text: text,
                    suggestions: classification.suggestion_list.clone(),
                    mode_echo: mode_echo.to_string(),
                    timestamp: Utc::now(),
                })
            }
            Err(e) => {
                error!(
                    mode = %mode,
                    provider = self.generator.name(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %e,
                    "Generation failed; returning apology"
                );
                Err(SafeFailure::for_mode(mode))
            }
        }
    }

    async fn generate_with_retry(&self, mode: Mode, prompt: &str) -> Result<String, GenerationError> {
        let attempts = self.policy.retries + 1;
        let mut last_error = None;

        for attempt in 1..=attempts {
            // Queueing behind the rate limiter does not count against the timeout.
            self.generator.ready().await;
            let result = match tokio::time::timeout(self.policy.timeout, self.generator.generate(prompt)).await {
                Ok(result) => result,
                Err(_) => Err(GenerationError::Timeout(self.policy.timeout)),
            };
            match result {
                Ok(text) => return Ok(text),
                Err(e @ GenerationError::NotConfigured(_)) => return Err(e),
                Err(e) => {
                    if attempt < attempts {
                        warn!(mode = %mode, attempt, error = %e, "Generation attempt failed, retrying");
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(GenerationError::EmptyResponse))
    }

    /// General chat. `message` is validated non-empty by the router.
    pub async fn chat(&self, message: &str, context: Option<&str>) -> Result<ResponseEnvelope, SafeFailure> {
        let classification = classifier::classify(Mode::Chat, Some(message), None);
        let input = PromptInput {
            text: message,
            context,
            ..Default::default()
        };
        self.assemble(&classification, &input, Mode::Chat.as_str()).await
    }

    /// Memory recall. The echoed memory type defaults to "general".
    pub async fn memory_lane(
        &self,
        query: Option<&str>,
        memory_type: Option<&str>,
    ) -> Result<ResponseEnvelope, SafeFailure> {
        let classification = classifier::classify_memory_query(query, memory_type);
        let echo = classification.topic.clone().unwrap_or_else(|| "general".to_string());
        let input = PromptInput {
            text: query.unwrap_or_default(),
            ..Default::default()
        };
        self.assemble(&classification, &input, &echo).await
    }

    /// Music suggestions. The echoed action defaults to "suggest".
    pub async fn music(
        &self,
        action: Option<&str>,
        query: Option<&str>,
        mood: Option<&str>,
    ) -> Result<MusicEnvelope, SafeFailure> {
        let classification = classifier::classify(Mode::Music, query, None);
        let action = action
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .unwrap_or("suggest");
        let input = PromptInput {
            text: query.unwrap_or_default(),
            mood,
            action: Some(action),
            ..Default::default()
        };
        let envelope = self.assemble(&classification, &input, action).await?;
        Ok(MusicEnvelope {
            envelope,
            playlists: classifier::playlists_for_mood(mood).to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{GENERAL_MEMORY_SUGGESTIONS, MEMORY_RECALL_SUGGESTIONS};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails the first `failures` calls, then echoes a fixed reply.
    struct ScriptedGenerator {
        failures: usize,
        calls: AtomicUsize,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        fn new(failures: usize) -> Arc<Self> {
            Arc::new(Self {
                failures,
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                Err(GenerationError::Status {
                    status: 503,
                    body: "Traceback (most recent call last): upstream exploded".into(),
                })
            } else {
                Ok("What a lovely thought.".into())
            }
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    struct SlowGenerator;

    #[async_trait]
    impl TextGenerator for SlowGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("too late".into())
        }

        fn name(&self) -> &'static str {
            "slow"
        }
    }

    fn assembler(generator: Arc<dyn TextGenerator>, retries: u32) -> ResponseAssembler {
        ResponseAssembler::new(
            generator,
            RetryPolicy {
                timeout: Duration::from_millis(100),
                retries,
            },
        )
    }

    /// Answers instantly, but only as fast as its rate limiter allows.
    struct LimitedGenerator {
        limiter: crate::llm::RateLimiter,
    }

    #[async_trait]
    impl TextGenerator for LimitedGenerator {
        async fn ready(&self) {
            self.limiter.acquire().await;
        }

        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            Ok("Right away.".into())
        }

        fn name(&self) -> &'static str {
            "limited"
        }
    }

    #[tokio::test]
    async fn test_rate_limit_wait_is_outside_timeout() {
        // 50ms spacing; the fifth call queues 200ms, twice the 100ms bound.
        let generator = Arc::new(LimitedGenerator {
            limiter: crate::llm::RateLimiter::per_minute(1200),
        });
        let assembler = Arc::new(assembler(generator, 0));

        let handles: Vec<_> = (0..5)
            .map(|_| {
                let assembler = assembler.clone();
                tokio::spawn(async move { assembler.chat("hello", None).await })
            })
            .collect();

        for handle in handles {
            let envelope = handle.await.unwrap().unwrap();
            assert_eq!(envelope.generated_text, "Right away.");
        }
    }

    #[tokio::test]
    async fn test_chat_success() {
        let generator = ScriptedGenerator::new(0);
        let envelope = assembler(generator.clone(), 1)
            .chat("I went to the park", None)
            .await
            .unwrap();

        assert_eq!(envelope.generated_text, "What a lovely thought.");
        assert_eq!(envelope.mode_echo, "chat");
        assert_eq!(envelope.suggestions.len(), 5);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
        assert!(generator.prompts.lock().unwrap()[0].contains("I went to the park"));
    }

    #[tokio::test]
    async fn test_retry_recovers_on_second_attempt() {
        let generator = ScriptedGenerator::new(1);
        let result = assembler(generator.clone(), 1).chat("Hello", None).await;
        assert!(result.is_ok());
        assert_eq!(generator.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_exhausted_retries_return_apology_only() {
        let generator = ScriptedGenerator::new(10);
        let failure = assembler(generator.clone(), 1).chat("Hello", None).await.unwrap_err();

        assert_eq!(failure.message, CHAT_APOLOGY);
        assert!(!failure.to_string().contains("Traceback"));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_timeout_returns_apology() {
        let failure = assembler(Arc::new(SlowGenerator), 0)
            .music(None, Some("Elvis"), None)
            .await
            .unwrap_err();
        assert_eq!(failure, SafeFailure { mode: Mode::Music, message: MUSIC_APOLOGY });
    }

    #[tokio::test]
    async fn test_memory_lane_selects_list_and_echo() {
        let generator = ScriptedGenerator::new(0);
        let assembler = assembler(generator.clone(), 0);

        let recall = assembler
            .memory_lane(Some("I remember the seaside"), Some("Family"))
            .await
            .unwrap();
        assert_eq!(recall.suggestions, MEMORY_RECALL_SUGGESTIONS.to_vec());
        assert_eq!(recall.mode_echo, "family");

        let general = assembler.memory_lane(None, None).await.unwrap();
        assert_eq!(general.suggestions, GENERAL_MEMORY_SUGGESTIONS.to_vec());
        assert_eq!(general.mode_echo, "general");
        assert!(generator.prompts.lock().unwrap()[1].contains("happy memories"));
    }

    #[tokio::test]
    async fn test_music_defaults_action_and_playlists() {
        let envelope = assembler(ScriptedGenerator::new(0), 0)
            .music(Some("  "), None, Some("calm"))
            .await
            .unwrap();
        assert_eq!(envelope.envelope.mode_echo, "suggest");
        assert_eq!(envelope.playlists[0].name, "Peaceful Piano");
    }

    #[test]
    fn test_apology_texts_are_calm() {
        for mode in [Mode::Chat, Mode::MemoryLane, Mode::Music] {
            let text = apology_for(mode);
            assert!(text.starts_with("I'm sorry"));
            assert!(!text.to_lowercase().contains("error"));
        }
    }
}
