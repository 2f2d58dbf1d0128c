//! # SunChat Core
//!
//! Shared foundation for the SunShield chat backend: configuration,
//! the error type, chat/RAG data types, and the completion-provider trait.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use error::{Result, SunChatError};
