//! LocalMind LLM - OpenAI-compatible chat and embedding client.
//!
//! This crate provides the async client used by the ingestion pipeline for
//! document summarization and chunk embedding, and by the CLI for grounded
//! question answering.

mod client;
mod error;
mod types;

pub use client::LlmClient;
pub use error::{LlmError, LlmResult};
pub use types::*;
