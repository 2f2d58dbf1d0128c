//! # SunChat LLM
//!
//! The completion client (any OpenAI-compatible chat API) and the prompt
//! assembly for the website chat widget.

pub mod prompt;

use async_trait::async_trait;
use serde_json::{Value, json};
use sunchat_core::config::LlmConfig;
use sunchat_core::error::{Result, SunChatError};
use sunchat_core::traits::CompletionProvider;
use sunchat_core::types::ChatTurn;

/// Generic client-facing failure message. Upstream details go to the log,
/// never to the widget.
const GENERATION_FAILED: &str = "response generation failed, please try again later";

/// A client for any OpenAI-compatible chat-completions API.
///
/// Constructed once at startup and shared across requests. Construction
/// fails fast when no API key can be resolved.
pub struct OpenAiCompatibleClient {
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    client: reqwest::Client,
}

impl OpenAiCompatibleClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = config.resolve_api_key()?;
        Ok(Self {
            api_key,
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client: reqwest::Client::new(),
        })
    }
}

#[async_trait]
impl CompletionProvider for OpenAiCompatibleClient {
    fn name(&self) -> &str {
        "openai-compatible"
    }

    /// One blocking request, one response. The full turn list (system prompt
    /// plus the entire session history) is sent on every call; there is no
    /// truncation or token budgeting. Any upstream failure is re-raised as a
    /// generic `Upstream` error — no retries, no partial output.
    async fn complete(&self, turns: &[ChatTurn]) -> Result<String> {
        let body = json!({
            "model": self.model,
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
            "messages": turns,
        });

        let url = format!("{}/chat/completions", self.base_url);
        let resp = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("completion request to {url} failed: {e}");
                SunChatError::Upstream(GENERATION_FAILED.into())
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            tracing::error!("completion API error {status}: {text}");
            return Err(SunChatError::Upstream(GENERATION_FAILED.into()));
        }

        let json: Value = resp.json().await.map_err(|e| {
            tracing::error!("completion response was not valid JSON: {e}");
            SunChatError::Upstream(GENERATION_FAILED.into())
        })?;

        json["choices"]
            .get(0)
            .and_then(|choice| choice["message"]["content"].as_str())
            .map(str::to_string)
            .ok_or_else(|| {
                tracing::error!("completion response had no choices");
                SunChatError::Upstream(GENERATION_FAILED.into())
            })
    }
}
