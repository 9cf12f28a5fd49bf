//! Keyword-based intent classification for the three conversation modes.
//!
//! Selection is a single pass over static tables: an ordered list of keyword
//! rules (first match wins) and fixed suggestion lists keyed by category.

mod tables;

use serde::{Deserialize, Serialize};

pub use tables::{
    CHAT_SUGGESTIONS, GENERAL_MEMORY_SUGGESTIONS, MEMORY_RECALL_KEYWORDS,
    MEMORY_RECALL_SUGGESTIONS, MUSIC_SUGGESTIONS, Playlist,
};

/// The three conversation modes exposed by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    Chat,
    MemoryLane,
    Music,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Chat => "chat",
            Mode::MemoryLane => "memory-lane",
            Mode::Music => "music",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which prompt template and suggestion list a request maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Free conversation (chat mode)
    Conversation,
    /// Memory-lane query that names a recollection outright
    MemoryRecall,
    /// Memory-lane query with no recall keyword; uses the declared memory type
    GeneralMemory,
    /// Music mode
    Music,
}

impl Category {
    /// The fixed suggestion list for this category.
    pub fn suggestions(&self) -> &'static [&'static str; 5] {
        match self {
            Category::Conversation => &CHAT_SUGGESTIONS,
            Category::MemoryRecall => &MEMORY_RECALL_SUGGESTIONS,
            Category::GeneralMemory => &GENERAL_MEMORY_SUGGESTIONS,
            Category::Music => &MUSIC_SUGGESTIONS,
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            Category::Conversation => Mode::Chat,
            Category::MemoryRecall | Category::GeneralMemory => Mode::MemoryLane,
            Category::Music => Mode::Music,
        }
    }
}

/// Prompt template identifiers. The template text lives with the assembler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptTemplate {
    Companion,
    GuidedRecall,
    OpenReminiscence,
    MusicGuide,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub matched_category: Category,
    pub prompt_template: PromptTemplate,
    pub suggestion_list: Vec<String>,
    /// Declared topic (memory type) carried into the prompt framing, if any
    pub topic: Option<String>,
}

impl ClassificationResult {
    fn for_category(category: Category) -> Self {
        let prompt_template = match category {
            Category::Conversation => PromptTemplate::Companion,
            Category::MemoryRecall => PromptTemplate::GuidedRecall,
            Category::GeneralMemory => PromptTemplate::OpenReminiscence,
            Category::Music => PromptTemplate::MusicGuide,
        };
        Self {
            matched_category: category,
            prompt_template,
            suggestion_list: category.suggestions().iter().map(|s| s.to_string()).collect(),
            topic: None,
        }
    }

    fn with_topic(mut self, topic: Option<&str>) -> Self {
        self.topic = topic
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty());
        self
    }
}

/// A specialized category and the keywords that select it.
struct KeywordRule {
    category: Category,
    keywords: &'static [&'static str],
}

/// Ordered; the first rule with a matching keyword wins.
const MEMORY_RULES: &[KeywordRule] = &[KeywordRule {
    category: Category::MemoryRecall,
    keywords: &MEMORY_RECALL_KEYWORDS,
}];

/// Case-insensitive substring match of any keyword anywhere in `text`.
fn contains_any(text: &str, keywords: &[&str]) -> bool {
    let lowered = text.to_lowercase();
    keywords.iter().any(|k| lowered.contains(k))
}

/// Classify a memory-lane query.
///
/// An absent or empty query is valid and falls back to the general category.
/// `declared_category` never overrides a keyword match; it is carried as the
/// topic that frames the prompt.
pub fn classify_memory_query(
    query: Option<&str>,
    declared_category: Option<&str>,
) -> ClassificationResult {
    let matched = query.and_then(|q| {
        MEMORY_RULES
            .iter()
            .find(|rule| contains_any(q, rule.keywords))
            .map(|rule| rule.category)
    });
    ClassificationResult::for_category(matched.unwrap_or(Category::GeneralMemory))
        .with_topic(declared_category)
}

/// Classify a request for the given mode.
pub fn classify(mode: Mode, query: Option<&str>, declared_category: Option<&str>) -> ClassificationResult {
    match mode {
        Mode::Chat => ClassificationResult::for_category(Category::Conversation),
        Mode::MemoryLane => classify_memory_query(query, declared_category),
        Mode::Music => ClassificationResult::for_category(Category::Music),
    }
}

/// Playlists for a mood; unknown or absent moods get the nostalgic set.
pub fn playlists_for_mood(mood: Option<&str>) -> &'static [Playlist] {
    let mood = mood.map(|m| m.trim().to_lowercase()).unwrap_or_default();
    match mood.as_str() {
        "calm" | "relaxed" => &tables::CALM_PLAYLISTS,
        "happy" | "upbeat" => &tables::HAPPY_PLAYLISTS,
        _ => &tables::NOSTALGIC_PLAYLISTS,
    }
}
