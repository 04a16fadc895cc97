//! In-memory vector index for tests and development.

use crate::error::StoreError;
use crate::index::{cosine_similarity, ChunkMatch, StoredChunk, VectorIndex};
use async_trait::async_trait;
use localmind_core::ChunkRecord;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Vector index that keeps everything in memory.
///
/// Records are kept in insertion order so pagination is stable; similarity
/// search is brute-force cosine, which is plenty for test-sized data.
#[derive(Default)]
pub struct MemoryIndex {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    records: Vec<ChunkRecord>,
    positions: HashMap<String, usize>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    async fn upsert(&self, records: &[ChunkRecord]) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        for record in records {
            let pos = inner.positions.get(&record.id).copied();
            match pos {
                Some(pos) => inner.records[pos] = record.clone(),
                None => {
                    let next = inner.records.len();
                    inner.positions.insert(record.id.clone(), next);
                    inner.records.push(record.clone());
                }
            }
        }
        debug!("Upserted {} records", records.len());
        Ok(())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.inner.read().await.records.len())
    }

    async fn get(&self, limit: usize, offset: usize) -> Result<Vec<StoredChunk>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .records
            .iter()
            .skip(offset)
            .take(limit)
            .map(|record| StoredChunk {
                id: record.id.clone(),
                text: record.text.clone(),
                metadata: record.metadata.clone(),
            })
            .collect())
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<ChunkMatch>, StoreError> {
        let inner = self.inner.read().await;

        let mut matches: Vec<ChunkMatch> = inner
            .records
            .iter()
            .map(|record| ChunkMatch {
                id: record.id.clone(),
                text: record.text.clone(),
                metadata: record.metadata.clone(),
                score: cosine_similarity(vector, &record.embedding),
            })
            .collect();

        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(top_k);
        Ok(matches)
    }
}
