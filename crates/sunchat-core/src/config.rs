//! SunChat configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, SunChatError};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SunChatConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
}

impl Default for SunChatConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            gateway: GatewayConfig::default(),
            store: StoreConfig::default(),
            knowledge: KnowledgeConfig::default(),
        }
    }
}

impl SunChatConfig {
    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SunChatError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| SunChatError::Config(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Resolve the config path: CLI override first, then the value of the
    /// SUNCHAT_CONFIG env var, then the default path.
    pub fn resolve_path(cli: Option<&str>, env: Option<&str>) -> PathBuf {
        cli.or(env).map(PathBuf::from).unwrap_or_else(Self::default_path)
    }

    /// Get the sunchat home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".sunchat")
    }
}

/// Completion service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// API key; falls back to SUNCHAT_API_KEY, then OPENAI_API_KEY.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    1024
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: String::new(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl LlmConfig {
    /// Resolve the API key: config value first, then env vars.
    ///
    /// Errors when no key can be found — the client must fail at startup,
    /// not on the first chat request.
    pub fn resolve_api_key(&self) -> Result<String> {
        if !self.api_key.is_empty() {
            return Ok(self.api_key.clone());
        }
        ["SUNCHAT_API_KEY", "OPENAI_API_KEY"]
            .iter()
            .find_map(|key| std::env::var(key).ok())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| SunChatError::ApiKeyMissing("SUNCHAT_API_KEY".into()))
    }
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    8080
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

/// Persistence configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path to the SQLite database; empty means ~/.sunchat/chat.db.
    #[serde(default)]
    pub db_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { db_path: String::new() }
    }
}

impl StoreConfig {
    pub fn resolved_db_path(&self) -> PathBuf {
        if self.db_path.is_empty() {
            SunChatConfig::home_dir().join("chat.db")
        } else {
            PathBuf::from(&self.db_path)
        }
    }
}

/// Knowledge base (chunking + retrieval) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: usize,
    /// Number of chunks retrieved per query.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_max_chunk_size() -> usize {
    1000
}
fn default_top_k() -> usize {
    3
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self { max_chunk_size: default_max_chunk_size(), top_k: default_top_k() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_flag_wins_over_env_var() {
        let path = SunChatConfig::resolve_path(Some("/etc/sunchat.toml"), Some("/tmp/alt.toml"));
        assert_eq!(path, PathBuf::from("/etc/sunchat.toml"));
    }

    #[test]
    fn env_var_wins_over_default() {
        let path = SunChatConfig::resolve_path(None, Some("/tmp/alt.toml"));
        assert_eq!(path, PathBuf::from("/tmp/alt.toml"));
    }

    #[test]
    fn default_path_is_the_last_resort() {
        assert_eq!(SunChatConfig::resolve_path(None, None), SunChatConfig::default_path());
    }
}
