// src/session/mod.rs — Session log types

pub mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::persona::Persona;
use crate::provider::Message;

/// Fixed at session start; `persona` is refreshed when the log is saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub model_name: String,
    /// Absent in logs written by older versions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Persona active when the log was written. Absent in older logs, in which
    /// case resume replays the handoff table over the user messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona: Option<Persona>,
    /// Unknown metadata fields survive a resume-and-save cycle.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SessionMetadata {
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            created_at: Some(Utc::now()),
            persona: None,
            extra: serde_json::Map::new(),
        }
    }
}

/// What goes to disk: metadata plus the conversation without SYSTEM messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionLog {
    pub metadata: SessionMetadata,
    pub history: Vec<Message>,
}
