// src/api/types.rs
// Wire types for the REST API, shared by the server handlers and the view client

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classifier::Playlist;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub version: String,
    pub model: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: Option<String>,
    /// Free-form context from the view; strings are used as-is, other JSON is rendered
    pub context: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryLaneRequest {
    pub query: Option<String>,
    #[serde(rename = "memoryType")]
    pub memory_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryLaneResponse {
    pub response: String,
    pub suggestions: Vec<String>,
    #[serde(rename = "memoryType")]
    pub memory_type: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpotifyRequest {
    pub action: Option<String>,
    pub query: Option<String>,
    pub mood: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    pub name: String,
    pub description: String,
}

impl From<Playlist> for PlaylistEntry {
    fn from(p: Playlist) -> Self {
        Self {
            name: p.name.to_string(),
            description: p.description.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyResponse {
    pub response: String,
    pub suggestions: Vec<String>,
    pub playlists: Vec<PlaylistEntry>,
    pub action: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceToTextResponse {
    pub text: String,
    pub confidence: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestMessageRequest {
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestMessageResponse {
    pub received: String,
    pub echo: String,
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

/// Error body as seen by clients.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default)]
    pub response: Option<String>,
}
