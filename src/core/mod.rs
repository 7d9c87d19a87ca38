// src/core/mod.rs — Conversation state

pub mod conversation;
