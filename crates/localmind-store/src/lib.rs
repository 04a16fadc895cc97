//! LocalMind Store - Durable state for the ingestion system.
//!
//! This crate provides:
//! - [`FolderStore`]: the folder registry, persisted as a single JSON
//!   snapshot rewritten in full on every mutation
//! - [`VectorIndex`]: the trait the pipeline writes chunk records through
//! - [`SqliteIndex`]: a local vector index backed by SQLite
//! - [`MemoryIndex`]: an in-memory index for tests and development

mod error;
mod folders;
mod index;
mod memory;
mod sqlite;

pub use error::{StoreError, StoreResult};
pub use folders::FolderStore;
pub use index::{cosine_similarity, ChunkMatch, StoredChunk, VectorIndex};
pub use memory::MemoryIndex;
pub use sqlite::SqliteIndex;
