//! SQLite persistence for chat sessions, messages, and RAG documents.
//!
//! One database, WAL mode, RFC3339 text timestamps. Documents are chunked
//! server-side on insert/update; a document's chunks are always replaced
//! wholesale (delete-all + re-insert) inside a single transaction, never
//! patched.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};
use sunchat_core::error::{Result, SunChatError};
use sunchat_core::types::{ChatMessage, ChatSession, RagChunk, RagDocument, Role};

pub struct ChatStore {
    conn: Mutex<Connection>,
    max_chunk_size: usize,
}

impl ChatStore {
    /// Open or create the chat database.
    pub fn open(path: &Path, max_chunk_size: usize) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path).map_err(store_err)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;").ok();
        Self::init(conn, max_chunk_size)
    }

    /// Open an in-memory database, mainly for tests.
    pub fn open_in_memory(max_chunk_size: usize) -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(store_err)?;
        Self::init(conn, max_chunk_size)
    }

    fn init(conn: Connection, max_chunk_size: usize) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys=ON;").map_err(store_err)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                title TEXT,
                active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id TEXT NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                cited_documents TEXT,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_messages_session ON messages(session_id);

            CREATE TABLE IF NOT EXISTS documents (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS chunks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                document_id INTEGER NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
                content TEXT NOT NULL,
                chunk_index INTEGER NOT NULL,
                metadata TEXT NOT NULL DEFAULT '{}'
            );
            CREATE INDEX IF NOT EXISTS idx_chunks_document ON chunks(document_id);",
        )
        .map_err(store_err)?;

        Ok(Self { conn: Mutex::new(conn), max_chunk_size })
    }

    // ---- Sessions ----

    /// Insert a new session. A fresh UUID is generated when `session_id` is
    /// absent; a caller-supplied duplicate ID surfaces as a store error (no
    /// retry logic).
    pub fn create_session(&self, session_id: Option<&str>) -> Result<ChatSession> {
        let id = match session_id {
            Some(id) => id.to_string(),
            None => uuid::Uuid::new_v4().to_string(),
        };
        let now = Utc::now();
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO sessions (id, title, active, created_at, updated_at)
             VALUES (?1, NULL, 1, ?2, ?2)",
            params![id, now.to_rfc3339()],
        )
        .map_err(store_err)?;
        Ok(ChatSession {
            session_id: id,
            title: None,
            active: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// All sessions, most recently updated first.
    pub fn list_sessions(&self) -> Result<Vec<ChatSession>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, title, active, created_at, updated_at
                 FROM sessions ORDER BY updated_at DESC",
            )
            .map_err(store_err)?;
        let rows = stmt.query_map([], session_from_row).map_err(store_err)?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    /// The session plus its full message list in append order.
    pub fn get_session(&self, session_id: &str) -> Result<(ChatSession, Vec<ChatMessage>)> {
        let conn = self.lock()?;
        let session = conn
            .query_row(
                "SELECT id, title, active, created_at, updated_at FROM sessions WHERE id = ?1",
                params![session_id],
                session_from_row,
            )
            .map_err(|e| not_found_or_store(e, || format!("session {session_id} not found")))?;

        let mut stmt = conn
            .prepare(
                "SELECT id, session_id, role, content, cited_documents, created_at
                 FROM messages WHERE session_id = ?1 ORDER BY id",
            )
            .map_err(store_err)?;
        let messages = stmt
            .query_map(params![session_id], message_from_row)
            .map_err(store_err)?
            .filter_map(|r| r.ok())
            .collect();
        Ok((session, messages))
    }

    /// Delete a session and (via cascade) its messages. Not-found is an
    /// error, not a silent no-op.
    pub fn delete_session(&self, session_id: &str) -> Result<()> {
        let conn = self.lock()?;
        let affected = conn
            .execute("DELETE FROM sessions WHERE id = ?1", params![session_id])
            .map_err(store_err)?;
        if affected == 0 {
            return Err(SunChatError::NotFound(format!("session {session_id} not found")));
        }
        Ok(())
    }

    /// Insert a message row. The caller verifies the session exists first.
    pub fn append_message(
        &self,
        session_id: &str,
        role: Role,
        content: &str,
        cited_documents: Option<&[i64]>,
    ) -> Result<ChatMessage> {
        let now = Utc::now();
        let cited_json = cited_documents
            .map(|ids| serde_json::to_string(ids))
            .transpose()
            .map_err(|e| SunChatError::Store(e.to_string()))?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO messages (session_id, role, content, cited_documents, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![session_id, role.as_str(), content, cited_json, now.to_rfc3339()],
        )
        .map_err(store_err)?;
        Ok(ChatMessage {
            id: conn.last_insert_rowid(),
            session_id: session_id.to_string(),
            role,
            content: content.to_string(),
            cited_documents: cited_documents.map(<[i64]>::to_vec),
            created_at: now,
        })
    }

    /// Bump `updated_at`; this alone drives most-recent-first listing.
    pub fn touch_session(&self, session_id: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "UPDATE sessions SET updated_at = ?1 WHERE id = ?2",
            params![Utc::now().to_rfc3339(), session_id],
        )
        .map_err(store_err)?;
        Ok(())
    }

    pub fn set_title(&self, session_id: &str, title: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "UPDATE sessions SET title = ?1 WHERE id = ?2",
            params![title, session_id],
        )
        .map_err(store_err)?;
        Ok(())
    }

    pub fn message_count(&self, session_id: &str) -> Result<i64> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT COUNT(*) FROM messages WHERE session_id = ?1",
            params![session_id],
            |r| r.get(0),
        )
        .map_err(store_err)
    }

    // ---- Documents & chunks ----

    /// Insert a document and chunk it in the same transaction.
    /// Returns the document and its chunk count.
    pub fn create_document(&self, content: &str) -> Result<(RagDocument, usize)> {
        let now = Utc::now();
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(store_err)?;
        tx.execute(
            "INSERT INTO documents (content, created_at, updated_at) VALUES (?1, ?2, ?2)",
            params![content, now.to_rfc3339()],
        )
        .map_err(store_err)?;
        let doc_id = tx.last_insert_rowid();
        let count = insert_chunks(&tx, doc_id, content, self.max_chunk_size)?;
        tx.commit().map_err(store_err)?;
        tracing::debug!("document {doc_id} stored as {count} chunk(s)");
        Ok((
            RagDocument { id: doc_id, content: content.to_string(), created_at: now, updated_at: now },
            count,
        ))
    }

    /// Replace a document's content and re-chunk it. The delete-all +
    /// re-insert runs in one transaction so a failure never leaves a
    /// half-chunked document behind.
    pub fn update_document(&self, id: i64, content: &str) -> Result<(RagDocument, usize)> {
        let now = Utc::now();
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(store_err)?;
        let created_at: String = tx
            .query_row("SELECT created_at FROM documents WHERE id = ?1", params![id], |r| {
                r.get(0)
            })
            .map_err(|e| not_found_or_store(e, || format!("document {id} not found")))?;
        tx.execute(
            "UPDATE documents SET content = ?1, updated_at = ?2 WHERE id = ?3",
            params![content, now.to_rfc3339(), id],
        )
        .map_err(store_err)?;
        tx.execute("DELETE FROM chunks WHERE document_id = ?1", params![id])
            .map_err(store_err)?;
        let count = insert_chunks(&tx, id, content, self.max_chunk_size)?;
        tx.commit().map_err(store_err)?;
        Ok((
            RagDocument {
                id,
                content: content.to_string(),
                created_at: parse_ts(&created_at),
                updated_at: now,
            },
            count,
        ))
    }

    pub fn get_document(&self, id: i64) -> Result<(RagDocument, Vec<RagChunk>)> {
        let conn = self.lock()?;
        let doc = conn
            .query_row(
                "SELECT id, content, created_at, updated_at FROM documents WHERE id = ?1",
                params![id],
                document_from_row,
            )
            .map_err(|e| not_found_or_store(e, || format!("document {id} not found")))?;
        let mut stmt = conn
            .prepare(
                "SELECT id, document_id, content, chunk_index, metadata
                 FROM chunks WHERE document_id = ?1 ORDER BY chunk_index",
            )
            .map_err(store_err)?;
        let chunks = stmt
            .query_map(params![id], chunk_from_row)
            .map_err(store_err)?
            .filter_map(|r| r.ok())
            .collect();
        Ok((doc, chunks))
    }

    /// All documents with their chunk counts, newest first.
    pub fn list_documents(&self) -> Result<Vec<(RagDocument, i64)>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT d.id, d.content, d.created_at, d.updated_at,
                        (SELECT COUNT(*) FROM chunks c WHERE c.document_id = d.id)
                 FROM documents d ORDER BY d.created_at DESC",
            )
            .map_err(store_err)?;
        let rows = stmt
            .query_map([], |row| Ok((document_from_row(row)?, row.get::<_, i64>(4)?)))
            .map_err(store_err)?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    pub fn delete_document(&self, id: i64) -> Result<()> {
        let conn = self.lock()?;
        let affected = conn
            .execute("DELETE FROM documents WHERE id = ?1", params![id])
            .map_err(store_err)?;
        if affected == 0 {
            return Err(SunChatError::NotFound(format!("document {id} not found")));
        }
        Ok(())
    }

    /// Every chunk across every document, id + content, ascending ID.
    /// Retrieval runs over this whole set; there is no per-session scoping.
    pub fn all_chunks(&self) -> Result<Vec<(i64, String)>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT id, content FROM chunks ORDER BY id")
            .map_err(store_err)?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .map_err(store_err)?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    /// Fetch chunks by ID, preserving the given (relevance) order.
    pub fn chunks_by_ids(&self, ids: &[i64]) -> Result<Vec<RagChunk>> {
        let conn = self.lock()?;
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            let chunk = conn
                .query_row(
                    "SELECT id, document_id, content, chunk_index, metadata
                     FROM chunks WHERE id = ?1",
                    params![id],
                    chunk_from_row,
                )
                .map_err(store_err)?;
            out.push(chunk);
        }
        Ok(out)
    }

    pub fn chunk_count(&self) -> Result<i64> {
        let conn = self.lock()?;
        conn.query_row("SELECT COUNT(*) FROM chunks", [], |r| r.get(0))
            .map_err(store_err)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| SunChatError::Store(e.to_string()))
    }
}

fn insert_chunks(
    tx: &rusqlite::Transaction<'_>,
    doc_id: i64,
    content: &str,
    max_chunk_size: usize,
) -> Result<usize> {
    let pieces = sunchat_knowledge::chunk_text(content, max_chunk_size);
    for (index, piece) in pieces.iter().enumerate() {
        tx.execute(
            "INSERT INTO chunks (document_id, content, chunk_index, metadata)
             VALUES (?1, ?2, ?3, '{}')",
            params![doc_id, piece, index as i64],
        )
        .map_err(store_err)?;
    }
    Ok(pieces.len())
}

fn store_err(e: rusqlite::Error) -> SunChatError {
    SunChatError::Store(e.to_string())
}

/// Map a missing row to `NotFound`; any other SQLite failure stays `Store`.
fn not_found_or_store(e: rusqlite::Error, what: impl FnOnce() -> String) -> SunChatError {
    match e {
        rusqlite::Error::QueryReturnedNoRows => SunChatError::NotFound(what()),
        other => store_err(other),
    }
}

fn parse_ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_default()
}

fn session_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ChatSession> {
    Ok(ChatSession {
        session_id: row.get(0)?,
        title: row.get(1)?,
        active: row.get::<_, i64>(2)? != 0,
        created_at: parse_ts(&row.get::<_, String>(3)?),
        updated_at: parse_ts(&row.get::<_, String>(4)?),
    })
}

fn message_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ChatMessage> {
    let cited: Option<String> = row.get(4)?;
    Ok(ChatMessage {
        id: row.get(0)?,
        session_id: row.get(1)?,
        role: Role::parse(&row.get::<_, String>(2)?).unwrap_or(Role::User),
        content: row.get(3)?,
        cited_documents: cited.and_then(|s| serde_json::from_str(&s).ok()),
        created_at: parse_ts(&row.get::<_, String>(5)?),
    })
}

fn document_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RagDocument> {
    Ok(RagDocument {
        id: row.get(0)?,
        content: row.get(1)?,
        created_at: parse_ts(&row.get::<_, String>(2)?),
        updated_at: parse_ts(&row.get::<_, String>(3)?),
    })
}

fn chunk_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RagChunk> {
    let metadata: String = row.get(4)?;
    Ok(RagChunk {
        id: row.get(0)?,
        document_id: row.get(1)?,
        content: row.get(2)?,
        chunk_index: row.get(3)?,
        metadata: serde_json::from_str(&metadata).unwrap_or_default(),
    })
}
