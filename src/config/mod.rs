// src/config/mod.rs
// Load every setting from the environment (and .env), falling back to defaults

use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    // ── Generation service
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub generation_timeout: u64,
    pub generation_retries: u32,
    pub rate_limit_rpm: u32,

    // ── Server
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
    pub debug_endpoints: bool,
    pub max_upload_bytes: usize,

    // ── Transcription service (OpenAI-compatible)
    pub transcription_base_url: Option<String>,
    pub transcription_api_key: Option<String>,
    pub transcription_model: String,

    // ── Conversation view
    pub backend_url: String,

    // ── Logging
    pub log_level: String,
}

/// Parse a variable, tolerating trailing `# comments` and whitespace.
/// Unparseable values fall back to the default.
fn env_var_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(val) => {
            let clean_val = val.split('#').next().unwrap_or("").trim();
            match clean_val.parse::<T>() {
                Ok(parsed) => parsed,
                Err(_) => {
                    eprintln!("Config: {} = '{}' (parse failed, using default)", key, val);
                    default
                }
            }
        }
        None => default,
    }
}

/// Optional string: unset or blank means `None`.
fn env_opt<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.split('#').next().unwrap_or("").trim().to_string())
        .filter(|v| !v.is_empty())
}

impl AppConfig {
    pub fn from_env() -> Self {
        if dotenvy::dotenv().is_err() {
            eprintln!("Warning: .env file not found. Using environment variables and defaults.");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let l = &lookup;
        Self {
            gemini_api_key: env_opt(l, "GEMINI_API_KEY"),
            gemini_base_url: env_var_or(l, "GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL.to_string()),
            model: env_var_or(l, "MEMORY_LANE_MODEL", "gemini-1.5-flash".to_string()),
            temperature: env_var_or(l, "MEMORY_LANE_TEMPERATURE", 0.7),
            max_output_tokens: env_var_or(l, "MEMORY_LANE_MAX_OUTPUT_TOKENS", 300),
            generation_timeout: env_var_or(l, "MEMORY_LANE_GENERATION_TIMEOUT", 12),
            generation_retries: env_var_or(l, "MEMORY_LANE_GENERATION_RETRIES", 1),
            rate_limit_rpm: env_var_or(l, "MEMORY_LANE_RATE_LIMIT_RPM", 38),
            host: env_var_or(l, "MEMORY_LANE_HOST", "127.0.0.1".to_string()),
            port: env_var_or(l, "MEMORY_LANE_PORT", 5001),
            cors_origin: env_var_or(l, "MEMORY_LANE_CORS_ORIGIN", "*".to_string()),
            debug_endpoints: env_var_or(l, "MEMORY_LANE_DEBUG_ENDPOINTS", false),
            max_upload_bytes: env_var_or(l, "MEMORY_LANE_MAX_UPLOAD_BYTES", 10 * 1024 * 1024),
            transcription_base_url: env_opt(l, "TRANSCRIPTION_BASE_URL"),
            transcription_api_key: env_opt(l, "TRANSCRIPTION_API_KEY"),
            transcription_model: env_var_or(l, "TRANSCRIPTION_MODEL", "whisper-1".to_string()),
            backend_url: env_var_or(l, "MEMORY_LANE_BACKEND_URL", "http://127.0.0.1:5001".to_string()),
            log_level: env_var_or(l, "MEMORY_LANE_LOG_LEVEL", "info".to_string()),
        }
    }

    /// Get server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// URL a local client uses to reach the server this config binds.
    /// Wildcard hosts map to loopback.
    pub fn local_url(&self) -> String {
        let host = match self.host.trim() {
            "" | "0.0.0.0" | "::" | "[::]" => "127.0.0.1",
            host => host,
        };
        format!("http://{}:{}", host, self.port)
    }

    /// Per-attempt bound on a generation call
    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout)
    }

    pub fn tracing_level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::INFO)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
