//! LocalMind Ingest - The folder-scan ingestion pipeline.
//!
//! This crate provides:
//! - File discovery with extension filtering
//! - Fixed-size content chunking for embedding
//! - Collaborator traits for enrichment and embedding
//! - The scan job registry and state machine
//! - Direct single-document text ingestion

mod chunker;
mod discovery;
mod error;
mod ingestor;
mod providers;
mod registry;

pub use chunker::chunk_text;
pub use discovery::{discover, DiscoveryPolicy};
pub use error::{IngestError, IngestResult};
pub use ingestor::{Ingestor, TextIngestOutcome};
pub use providers::{Embedder, Enricher};
pub use registry::JobRegistry;
