//! Error type shared across all sunchat crates.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SunChatError>;

/// Errors that can surface from any layer of the chat backend.
///
/// The gateway maps these onto HTTP statuses: `Validation` → 400,
/// `NotFound` → 404, everything else → 500.
#[derive(Debug, Error)]
pub enum SunChatError {
    #[error("config error: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("{0}")]
    Upstream(String),

    #[error("API key missing: set llm.api_key in config or the {0} env var")]
    ApiKeyMissing(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
