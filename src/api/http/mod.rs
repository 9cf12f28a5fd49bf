// src/api/http/mod.rs

pub mod chat;
pub mod handlers;
pub mod memory;
pub mod music;
pub mod router;
pub mod voice;
