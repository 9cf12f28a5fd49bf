// src/classifier/tables.rs
// Static keyword, suggestion and playlist tables. Keywords must be lowercase.

use serde::Serialize;

pub const MEMORY_RECALL_KEYWORDS: [&str; 8] = [
    "remember",
    "recall",
    "memory",
    "memories",
    "childhood",
    "used to",
    "back when",
    "years ago",
];

pub const MEMORY_RECALL_SUGGESTIONS: [&str; 5] = [
    "Tell me more about that time",
    "Who was there with you?",
    "What did it look like?",
    "How did it make you feel?",
    "Is there a photo from then?",
];

pub const GENERAL_MEMORY_SUGGESTIONS: [&str; 5] = [
    "Tell me about your family",
    "What was your favourite place as a child?",
    "Do you remember your first job?",
    "What songs did you love growing up?",
    "Tell me about a special holiday",
];

pub const CHAT_SUGGESTIONS: [&str; 5] = [
    "How are you feeling today?",
    "Tell me about your morning",
    "Would you like to hear some music?",
    "Shall we look back at a happy memory?",
    "What would you like to talk about?",
];

pub const MUSIC_SUGGESTIONS: [&str; 5] = [
    "Play songs from the 1960s",
    "Something calm and relaxing",
    "Music to dance to",
    "Songs from my wedding day",
    "Play my favourite singer",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Playlist {
    pub name: &'static str,
    pub description: &'static str,
}

pub const CALM_PLAYLISTS: [Playlist; 3] = [
    Playlist {
        name: "Peaceful Piano",
        description: "Gentle piano pieces for a quiet afternoon",
    },
    Playlist {
        name: "Evening Classics",
        description: "Soft classical favourites to unwind with",
    },
    Playlist {
        name: "Garden Birdsong",
        description: "Nature sounds and light strings",
    },
];

pub const HAPPY_PLAYLISTS: [Playlist; 3] = [
    Playlist {
        name: "Dance Hall Favourites",
        description: "Swing and big band tunes to tap along to",
    },
    Playlist {
        name: "Sunny Sing-Alongs",
        description: "Cheerful songs everyone knows the words to",
    },
    Playlist {
        name: "Motown Gold",
        description: "Feel-good soul from the 1960s",
    },
];

pub const NOSTALGIC_PLAYLISTS: [Playlist; 3] = [
    Playlist {
        name: "Golden Oldies",
        description: "Hits from the 1950s and 1960s",
    },
    Playlist {
        name: "Songs of Our Youth",
        description: "Timeless love songs and ballads",
    },
    Playlist {
        name: "Radio Memories",
        description: "The tunes that filled the airwaves back then",
    },
];
