//! The vector index contract the pipeline writes through.

use crate::error::StoreError;
use async_trait::async_trait;
use localmind_core::ChunkRecord;

/// A stored chunk as returned by listing/lookup, without its embedding.
#[derive(Debug, Clone)]
pub struct StoredChunk {
    pub id: String,
    pub text: String,
    pub metadata: serde_json::Value,
}

/// One nearest-neighbor match for a query vector.
#[derive(Debug, Clone)]
pub struct ChunkMatch {
    pub id: String,
    pub text: String,
    pub metadata: serde_json::Value,
    /// Cosine similarity against the query vector.
    pub score: f32,
}

/// Store of (id, text, vector, metadata) records with similarity search.
///
/// Upserts are keyed by chunk id, so re-ingesting an unchanged document
/// overwrites its previous records instead of duplicating them.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert or replace a batch of chunk records.
    async fn upsert(&self, records: &[ChunkRecord]) -> Result<(), StoreError>;

    /// Total number of stored records.
    async fn count(&self) -> Result<usize, StoreError>;

    /// Page through stored records in a stable order.
    async fn get(&self, limit: usize, offset: usize) -> Result<Vec<StoredChunk>, StoreError>;

    /// Nearest-neighbor search by vector, best matches first.
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<ChunkMatch>, StoreError>;
}

/// Cosine similarity between two vectors, 0.0 for mismatched or empty input.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    let denominator = norm_a * norm_b;
    if denominator == 0.0 {
        return 0.0;
    }

    dot / denominator
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]), 1.0);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 1.0], &[1.0, 0.0]) - 0.7071).abs() < 1e-3);
    }

    #[test]
    fn test_cosine_similarity_degenerate_input() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }
}
