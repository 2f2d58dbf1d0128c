//! Provider trait — the seam between the orchestrator and the completion API.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::ChatTurn;

/// A text-completion service: takes an ordered list of role/content turns
/// (system prompt first) and returns a single assistant completion.
///
/// One request, one response. No streaming, no retries.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider name, for logging.
    fn name(&self) -> &str;

    async fn complete(&self, turns: &[ChatTurn]) -> Result<String>;
}
