//! # SunChat Gateway
//!
//! JSON HTTP surface for the website chat widget and the RAG document
//! admin, all under `/api/v1/chat`.

pub mod error;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use server::{AppState, build_router, start};
