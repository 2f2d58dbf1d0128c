//! # SunChat Knowledge
//!
//! Lightweight RAG primitives — no vector DB, no embeddings.
//!
//! ## Design
//! - **Chunking** — split documents into bounded-size chunks along
//!   paragraph/sentence/word boundaries (default 1000 chars)
//! - **Keyword scoring** — whole-word overlap counts, top-K selection
//!
//! ## How it works
//! ```text
//! Visitor: "What financing options do you offer?"
//!   ↓
//! search::top_chunks(query, 3, all stored chunks)
//!   ↓ word-overlap scoring
//! Top 3 chunks from uploaded documents
//!   ↓
//! Injected into the system prompt as context
//!   ↓
//! Assistant responds with a grounded answer
//! ```
//!
//! Keyword overlap is a deliberate stand-in for semantic search: queries
//! sharing no long words with a chunk score zero even when topically
//! related. That precision limit is accepted for a low-traffic marketing
//! chat widget.

pub mod chunker;
pub mod search;

pub use chunker::chunk_text;
pub use search::top_chunks;
