//! Conversation view
//!
//! In-memory session of chat turns, the typed client for the REST API and a
//! line-oriented terminal front end. Nothing here is persisted.

pub mod client;
pub mod terminal;
pub mod voice_clip;

pub use client::{BackendClient, ClientError, Reply};

use chrono::{DateTime, Utc};
use std::str::FromStr;
use uuid::Uuid;

use crate::classifier::Mode;

/// One message in the session. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurn {
    pub id: Uuid,
    pub text: String,
    pub is_user_authored: bool,
    pub created_at: DateTime<Utc>,
}

impl ChatTurn {
    fn new(text: impl Into<String>, is_user_authored: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            is_user_authored,
            created_at: Utc::now(),
        }
    }
}

/// Which endpoint and payload shape the view uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ModeContext {
    #[default]
    #[value(name = "chat")]
    GeneralChat,
    #[value(name = "memory")]
    MemoryRecall,
    #[value(name = "music")]
    Music,
}

impl ModeContext {
    pub fn mode(&self) -> Mode {
        match self {
            ModeContext::GeneralChat => Mode::Chat,
            ModeContext::MemoryRecall => Mode::MemoryLane,
            ModeContext::Music => Mode::Music,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ModeContext::GeneralChat => "chat",
            ModeContext::MemoryRecall => "memory",
            ModeContext::Music => "music",
        }
    }
}

impl FromStr for ModeContext {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chat" | "general" => Ok(ModeContext::GeneralChat),
            "memory" | "memory-lane" | "memories" => Ok(ModeContext::MemoryRecall),
            "music" | "spotify" => Ok(ModeContext::Music),
            other => Err(format!("unknown mode '{other}' (try chat, memory or music)")),
        }
    }
}

#[derive(Debug, Default)]
pub struct ConversationSession {
    turns: Vec<ChatTurn>,
    mode: ModeContext,
}

impl ConversationSession {
    pub fn new(mode: ModeContext) -> Self {
        Self {
            turns: Vec::new(),
            mode,
        }
    }

    pub fn mode(&self) -> ModeContext {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ModeContext) {
        self.mode = mode;
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn push_user(&mut self, text: impl Into<String>) -> &ChatTurn {
        self.turns.push(ChatTurn::new(text, true));
        &self.turns[self.turns.len() - 1]
    }

    pub fn push_assistant(&mut self, text: impl Into<String>) -> &ChatTurn {
        self.turns.push(ChatTurn::new(text, false));
        &self.turns[self.turns.len() - 1]
    }

    /// Record the user's text, send it in the current mode and record the reply.
    pub async fn submit(&mut self, client: &BackendClient, text: &str) -> Reply {
        self.push_user(text);
        let reply = client.send(self.mode, text).await;
        self.push_assistant(reply.text.clone());
        reply
    }
}
