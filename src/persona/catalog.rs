// src/persona/catalog.rs — Prompt catalog and project context loading

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use super::Persona;
use crate::infra::errors::ScribeError;

#[derive(Debug, Clone, Deserialize)]
struct PromptEntry {
    system_prompt: String,
}

/// System prompt per persona. Every persona has an entry.
#[derive(Debug, Clone)]
pub struct PromptCatalog {
    prompts: HashMap<Persona, String>,
}

impl PromptCatalog {
    pub fn load(path: &Path) -> Result<Self, ScribeError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ScribeError::Catalog(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Parse a catalog keyed by persona key. Unknown keys are ignored.
    pub fn from_json(json: &str) -> Result<Self, ScribeError> {
        let raw: HashMap<String, PromptEntry> = serde_json::from_str(json)
            .map_err(|e| ScribeError::Catalog(format!("invalid prompt catalog: {}", e)))?;

        let mut prompts = HashMap::new();
        for persona in Persona::ALL {
            let entry = raw.get(persona.key()).ok_or_else(|| {
                ScribeError::Catalog(format!("missing prompt for persona '{}'", persona))
            })?;
            prompts.insert(persona, entry.system_prompt.clone());
        }

        for key in raw.keys().filter(|k| Persona::from_key(k).is_none()) {
            tracing::debug!("ignoring unknown persona '{}' in prompt catalog", key);
        }

        Ok(Self { prompts })
    }

    pub fn prompt(&self, persona: Persona) -> &str {
        self.prompts
            .get(&persona)
            .map(String::as_str)
            .unwrap_or_default()
    }
}

/// Arbitrary project description injected into the first system message.
#[derive(Debug, Clone)]
pub struct ProjectContext(serde_json::Value);

impl ProjectContext {
    pub fn load(path: &Path) -> Result<Self, ScribeError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ScribeError::Catalog(format!("cannot read {}: {}", path.display(), e))
        })?;
        let value = serde_json::from_str(&content).map_err(|e| {
            ScribeError::Catalog(format!("invalid project context {}: {}", path.display(), e))
        })?;
        Ok(Self(value))
    }

    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn pretty(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| self.0.to_string())
    }
}

/// Opening system message: project context followed by the router's prompt.
pub fn initial_system_prompt(catalog: &PromptCatalog, context: &ProjectContext) -> String {
    format!(
        "PROJECT CONTEXT:\n```json\n{}\n```\n\nINSTRUCTIONS:\n{}",
        context.pretty(),
        catalog.prompt(Persona::Conductor)
    )
}
