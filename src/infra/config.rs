// src/infra/config.rs — Configuration loading (TOML)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::infra::errors::ScribeError;
use crate::infra::paths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ollama: OllamaConfig,

    #[serde(default)]
    pub files: FilesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub base_url: String,
    /// Per-request timeout for chat completions. Local models can be slow.
    pub timeout_seconds: u64,
    /// Sent to Ollama as `options.num_ctx`.
    pub context_window: u32,
    /// Models whose name starts with this are hidden (embedding models).
    pub exclude_prefix: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:11434".into(),
            timeout_seconds: 360,
            context_window: 4096,
            exclude_prefix: "nomic".into(),
        }
    }
}

impl OllamaConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    pub prompts: PathBuf,
    pub context: PathBuf,
    pub log_dir: PathBuf,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            prompts: PathBuf::from("prompts.json"),
            context: PathBuf::from("project_context.json"),
            log_dir: PathBuf::from("compliance_logs"),
        }
    }
}

impl Config {
    /// Load config from file, falling back to defaults.
    pub fn load() -> Result<Self, ScribeError> {
        let path = paths::config_file_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ScribeError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| ScribeError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ScribeError> {
        if self.ollama.base_url.trim().is_empty() {
            return Err(ScribeError::Config("ollama.base_url must not be empty".into()));
        }
        if self.ollama.timeout_seconds == 0 {
            return Err(ScribeError::Config(
                "ollama.timeout_seconds must be greater than zero".into(),
            ));
        }
        if self.ollama.exclude_prefix.is_empty() {
            return Err(ScribeError::Config(
                "ollama.exclude_prefix must not be empty (every model name starts with \"\")"
                    .into(),
            ));
        }
        Ok(())
    }
}
