//! Handlers for the chat/RAG API.
//!
//! | Method   | Path                          | Notes |
//! |----------|-------------------------------|-------|
//! | `POST`   | `/sessions`                   | Body `{"sessionId"?}` → 201 |
//! | `GET`    | `/sessions`                   | Most recently updated first |
//! | `GET`    | `/sessions/{sessionId}`       | Session + ordered messages, 404 if unknown |
//! | `DELETE` | `/sessions/{sessionId}`       | Cascades to messages, 404 if unknown |
//! | `POST`   | `/messages`                   | `{"sessionId","content","useRAG"?}` → assistant reply |
//! | `GET`    | `/documents`                  | |
//! | `POST`   | `/documents`                  | Chunked server-side → 201 |
//! | `GET`    | `/documents/{id}`             | Document + chunks |
//! | `PUT`    | `/documents/{id}`             | Re-chunks wholesale |
//! | `DELETE` | `/documents/{id}`             | Cascades to chunks |

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sunchat_core::SunChatError;
use sunchat_core::types::{ChatMessage, ChatSession, RagChunk, RagDocument};

use crate::error::ApiError;
use crate::server::AppState;

pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

// ---- Sessions ----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionBody {
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionWithMessages {
    #[serde(flatten)]
    pub session: ChatSession,
    pub messages: Vec<ChatMessage>,
}

/// `POST /sessions` — body: `{"sessionId"?: "..."}`
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateSessionBody>,
) -> Result<impl IntoResponse, ApiError> {
    if matches!(body.session_id.as_deref(), Some(id) if id.trim().is_empty()) {
        return Err(SunChatError::Validation("sessionId must not be empty".into()).into());
    }
    let session = state.store.create_session(body.session_id.as_deref())?;
    tracing::info!(session = session.session_id.as_str(), "session created");
    Ok((StatusCode::CREATED, Json(session)))
}

/// `GET /sessions`
pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ChatSession>>, ApiError> {
    Ok(Json(state.store.list_sessions()?))
}

/// `GET /sessions/{sessionId}`
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionWithMessages>, ApiError> {
    let (session, messages) = state.store.get_session(&session_id)?;
    Ok(Json(SessionWithMessages { session, messages }))
}

/// `DELETE /sessions/{sessionId}`
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.store.delete_session(&session_id)?;
    Ok(Json(json!({ "message": "session deleted" })))
}

// ---- Messages ----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageBody {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, rename = "useRAG")]
    pub use_rag: bool,
}

/// `POST /messages` — runs the full orchestration and returns the persisted
/// assistant message.
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SendMessageBody>,
) -> Result<Json<ChatMessage>, ApiError> {
    let session_id = body
        .session_id
        .as_deref()
        .ok_or_else(|| SunChatError::Validation("sessionId is required".into()))?;
    let content = body
        .content
        .as_deref()
        .ok_or_else(|| SunChatError::Validation("content is required".into()))?;
    let reply = state.agent.send_message(session_id, content, body.use_rag).await?;
    Ok(Json(reply))
}

// ---- Documents ----

#[derive(Debug, Deserialize)]
pub struct DocumentBody {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    #[serde(flatten)]
    pub document: RagDocument,
    pub chunk_count: i64,
}

#[derive(Debug, Serialize)]
pub struct DocumentWithChunks {
    #[serde(flatten)]
    pub document: RagDocument,
    pub chunks: Vec<RagChunk>,
}

fn require_content(body: &DocumentBody) -> Result<&str, ApiError> {
    match body.content.as_deref() {
        Some(c) if !c.trim().is_empty() => Ok(c),
        _ => Err(SunChatError::Validation("content is required".into()).into()),
    }
}

/// `GET /documents`
pub async fn list_documents(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<DocumentSummary>>, ApiError> {
    let docs = state
        .store
        .list_documents()?
        .into_iter()
        .map(|(document, chunk_count)| DocumentSummary { document, chunk_count })
        .collect();
    Ok(Json(docs))
}

/// `POST /documents` — chunks the content server-side.
pub async fn create_document(
    State(state): State<Arc<AppState>>,
    Json(body): Json<DocumentBody>,
) -> Result<impl IntoResponse, ApiError> {
    let content = require_content(&body)?;
    let (document, chunk_count) = state.store.create_document(content)?;
    tracing::info!(doc = document.id, chunks = chunk_count, "document ingested");
    Ok((
        StatusCode::CREATED,
        Json(DocumentSummary { document, chunk_count: chunk_count as i64 }),
    ))
}

/// `GET /documents/{id}`
pub async fn get_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<DocumentWithChunks>, ApiError> {
    let (document, chunks) = state.store.get_document(id)?;
    Ok(Json(DocumentWithChunks { document, chunks }))
}

/// `PUT /documents/{id}` — replaces content and re-chunks wholesale.
pub async fn update_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<DocumentBody>,
) -> Result<Json<DocumentSummary>, ApiError> {
    let content = require_content(&body)?;
    let (document, chunk_count) = state.store.update_document(id, content)?;
    Ok(Json(DocumentSummary { document, chunk_count: chunk_count as i64 }))
}

/// `DELETE /documents/{id}`
pub async fn delete_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.store.delete_document(id)?;
    Ok(Json(json!({ "message": "document deleted" })))
}
