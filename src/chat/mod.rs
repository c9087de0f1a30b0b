//! Civic chat assistant.
//!
//! This module provides the LLM-backed question answering client and its
//! keyword fallback.

pub mod client;
pub mod knowledge;

pub use client::ChatClient;
pub use knowledge::{KnowledgeBase, KnowledgeEntry};
