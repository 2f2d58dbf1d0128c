//! # SunChat Agent
//!
//! The chat orchestrator. Per incoming widget message:
//! persist user turn → (optional) keyword retrieval over all stored chunks →
//! prompt assembly → completion call → persist assistant turn → lazy title.
//!
//! Failure semantics are deliberately simple: nothing is retried and nothing
//! rolls back. A user message can exist with no matching reply when the
//! completion call fails. Concurrent sends to the same session are not
//! mutually excluded; message order is whatever the store's append order
//! yields.

use std::sync::Arc;

use sunchat_core::error::{Result, SunChatError};
use sunchat_core::traits::CompletionProvider;
use sunchat_core::types::{ChatMessage, ChatTurn, Role};
use sunchat_llm::prompt::build_system_prompt;
use sunchat_store::ChatStore;

/// Sessions get a title only within their first two exchanges.
const TITLE_MESSAGE_WINDOW: i64 = 4;
const TITLE_MAX_CHARS: usize = 50;

pub struct ChatAgent {
    store: Arc<ChatStore>,
    provider: Arc<dyn CompletionProvider>,
    top_k: usize,
}

impl ChatAgent {
    pub fn new(store: Arc<ChatStore>, provider: Arc<dyn CompletionProvider>, top_k: usize) -> Self {
        Self { store, provider, top_k }
    }

    /// Handle one incoming user message and return the persisted assistant
    /// reply. The session must already exist — there is no auto-creation on
    /// the message path.
    pub async fn send_message(
        &self,
        session_id: &str,
        content: &str,
        use_rag: bool,
    ) -> Result<ChatMessage> {
        if session_id.trim().is_empty() {
            return Err(SunChatError::Validation("sessionId is required".into()));
        }
        if content.trim().is_empty() {
            return Err(SunChatError::Validation("content is required".into()));
        }

        let (session, history) = self.store.get_session(session_id)?;

        self.store.touch_session(session_id)?;
        self.store.append_message(session_id, Role::User, content, None)?;

        let (context, citations) = if use_rag {
            self.retrieve_context(content)?
        } else {
            (None, None)
        };

        let mut turns = Vec::with_capacity(history.len() + 2);
        turns.push(ChatTurn::system(build_system_prompt(context.as_deref())));
        for m in &history {
            turns.push(ChatTurn { role: m.role, content: m.content.clone() });
        }
        turns.push(ChatTurn::user(content));

        let reply = self.provider.complete(&turns).await?;

        let assistant = self.store.append_message(
            session_id,
            Role::Assistant,
            &reply,
            citations.as_deref(),
        )?;

        if session.title.is_none()
            && self.store.message_count(session_id)? <= TITLE_MESSAGE_WINDOW
        {
            self.store.set_title(session_id, &derive_title(content))?;
        }

        tracing::info!(
            session = session_id,
            provider = self.provider.name(),
            rag = use_rag,
            cited = citations.as_ref().map(Vec::len).unwrap_or(0),
            "chat turn completed"
        );
        Ok(assistant)
    }

    /// Score every stored chunk against the query and return the top-K
    /// contents (double-newline-joined) plus the distinct parent document
    /// IDs. Returns nothing when no chunk matches or none are stored.
    fn retrieve_context(&self, query: &str) -> Result<(Option<String>, Option<Vec<i64>>)> {
        if self.store.chunk_count()? == 0 {
            return Ok((None, None));
        }
        let all = self.store.all_chunks()?;
        let pairs: Vec<(i64, &str)> = all.iter().map(|(id, c)| (*id, c.as_str())).collect();
        let top = sunchat_knowledge::top_chunks(query, self.top_k, &pairs);
        if top.is_empty() {
            return Ok((None, None));
        }

        let selected = self.store.chunks_by_ids(&top)?;
        let context = selected
            .iter()
            .map(|c| c.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let mut doc_ids: Vec<i64> = selected.iter().map(|c| c.document_id).collect();
        doc_ids.sort_unstable();
        doc_ids.dedup();
        Ok((Some(context), Some(doc_ids)))
    }
}

/// Truncate a user message into a session title, ellipsized when cut.
fn derive_title(content: &str) -> String {
    let trimmed = content.trim();
    if trimmed.chars().count() <= TITLE_MAX_CHARS {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(TITLE_MAX_CHARS).collect();
    format!("{}...", cut.trim_end())
}
