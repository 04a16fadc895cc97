//! Collaborator traits at the pipeline's external seams.
//!
//! The scan pipeline talks to the LLM provider only through these traits,
//! so tests can substitute deterministic fakes and the provider can be
//! swapped without touching the state machine.

use crate::error::IngestResult;
use async_trait::async_trait;
use localmind_core::DocumentDigest;
use localmind_llm::LlmClient;

/// Produces a document-level summary and keyword list.
#[async_trait]
pub trait Enricher: Send + Sync {
    async fn digest(&self, text: &str) -> IngestResult<DocumentDigest>;
}

/// Maps an ordered batch of text segments to one vector per segment.
///
/// Order is preserved; the whole batch fails atomically.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, texts: &[String]) -> IngestResult<Vec<Vec<f32>>>;
}

#[async_trait]
impl Enricher for LlmClient {
    async fn digest(&self, text: &str) -> IngestResult<DocumentDigest> {
        Ok(self.summarize_document(text).await?)
    }
}

#[async_trait]
impl Embedder for LlmClient {
    async fn embed(&self, texts: &[String]) -> IngestResult<Vec<Vec<f32>>> {
        Ok(self.embed_texts(texts).await?)
    }
}
