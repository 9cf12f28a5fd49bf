// src/lib.rs

pub mod api;
pub mod assembler;
pub mod classifier;
pub mod config;
pub mod conversation;
pub mod llm;
pub mod shell;
pub mod state;
pub mod voice;
