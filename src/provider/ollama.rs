// src/provider/ollama.rs — Ollama local model provider and model registry client

use async_trait::async_trait;
use std::time::Duration;

use super::{ChatRequest, ChatResponse, ModelProvider, TokenUsage};
use crate::infra::config::OllamaConfig;
use crate::infra::errors::ScribeError;

/// Listing is interactive, so it gets a short timeout of its own.
const LIST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct OllamaProvider {
    base_url: String,
    context_window: u32,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(config: &OllamaConfig) -> Result<Self, ScribeError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ScribeError::provider(format!("Cannot build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            context_window: config.context_window,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch installed model names from `/api/tags`, unfiltered.
    pub async fn fetch_models(&self) -> Result<Vec<String>, ScribeError> {
        let resp = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .timeout(LIST_TIMEOUT)
            .send()
            .await
            .map_err(|e| ScribeError::provider(format!("Cannot reach Ollama: {}", e)))?;

        if !resp.status().is_success() {
            return Err(ScribeError::provider(format!(
                "HTTP {} from /api/tags",
                resp.status()
            )));
        }

        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| ScribeError::provider(format!("Invalid Ollama response: {}", e)))?;

        Ok(body["models"]
            .as_array()
            .map(|models| {
                models
                    .iter()
                    .filter_map(|m| m["name"].as_str().map(|s| s.to_string()))
                    .collect::<Vec<String>>()
            })
            .unwrap_or_default())
    }

    /// Selectable models: everything not starting with `exclude_prefix`,
    /// sorted. Any failure is reported to the operator and yields an empty list.
    pub async fn list_models(&self, exclude_prefix: &str) -> Vec<String> {
        match self.fetch_models().await {
            Ok(models) => filter_models(models, exclude_prefix),
            Err(e) => {
                tracing::error!(base_url = %self.base_url, "model listing failed: {}", e);
                eprintln!(
                    "ERROR: Error contacting Ollama at {}. Is it running? Details: {}",
                    self.base_url, e
                );
                Vec::new()
            }
        }
    }
}

/// Drop names with the excluded prefix (plain, case-sensitive), sort, dedup.
/// Every name starts with the empty string, so `""` drops everything.
pub fn filter_models(models: Vec<String>, exclude_prefix: &str) -> Vec<String> {
    let mut kept: Vec<String> = models
        .into_iter()
        .filter(|m| !m.starts_with(exclude_prefix))
        .collect();
    kept.sort();
    kept.dedup();
    kept
}

#[async_trait]
impl ModelProvider for OllamaProvider {
    fn id(&self) -> &str {
        "ollama"
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ScribeError> {
        let messages: Vec<serde_json::Value> = request
            .messages
            .iter()
            .map(|m| {
                serde_json::json!({
                    "role": m.role.as_wire(),
                    "content": m.content,
                })
            })
            .collect();

        tracing::debug!(
            model = %request.model,
            messages = messages.len(),
            "sending chat request"
        );

        let body = serde_json::json!({
            "model": request.model,
            "messages": messages,
            "stream": false,
            "options": { "num_ctx": self.context_window },
        });

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ScribeError::provider(format!("Request timed out: {}", e))
                } else {
                    ScribeError::provider(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            return Err(ScribeError::provider(format!(
                "HTTP {}: {}",
                status, error_body
            )));
        }

        let resp: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ScribeError::provider(format!("Failed to parse response: {}", e)))?;

        let content = resp["message"]["content"]
            .as_str()
            .ok_or_else(|| ScribeError::provider("Response has no message content"))?
            .to_string();

        let usage = TokenUsage {
            input_tokens: resp["prompt_eval_count"].as_u64().unwrap_or(0) as u32,
            output_tokens: resp["eval_count"].as_u64().unwrap_or(0) as u32,
        };

        Ok(ChatResponse { content, usage })
    }
}
