//! SQLite-backed vector index.

use crate::error::{StoreError, StoreResult};
use crate::index::{cosine_similarity, ChunkMatch, StoredChunk, VectorIndex};
use async_trait::async_trait;
use chrono::Utc;
use localmind_core::ChunkRecord;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use std::path::Path;
use tracing::{debug, info};

/// Type alias for the connection pool.
pub type ConnectionPool = Pool<SqliteConnectionManager>;
type PooledConn = PooledConnection<SqliteConnectionManager>;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS chunks (
    id TEXT PRIMARY KEY,
    content TEXT NOT NULL,
    vector BLOB NOT NULL,
    dimensions INTEGER NOT NULL,
    metadata TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

/// Local vector index stored in a SQLite file.
///
/// Embeddings are stored as little-endian f32 blobs and searched with a
/// brute-force cosine pass, which is fine for personal-scale corpora.
#[derive(Clone)]
pub struct SqliteIndex {
    pool: ConnectionPool,
}

impl SqliteIndex {
    /// Open (or create) an index at the specified path.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        info!("Opening vector index at: {}", path.display());

        let manager = SqliteConnectionManager::file(path).with_init(|conn| {
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;",
            )?;
            Ok(())
        });

        let pool = Pool::builder().max_size(4).build(manager)?;

        {
            let conn = pool.get()?;
            conn.execute_batch(SCHEMA)?;
        }

        Ok(Self { pool })
    }

    /// Open an in-memory index (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        let manager = SqliteConnectionManager::memory();
        // A memory database only exists on its own connection.
        let pool = Pool::builder().max_size(1).build(manager)?;

        {
            let conn = pool.get()?;
            conn.execute_batch(SCHEMA)?;
        }

        Ok(Self { pool })
    }

    fn conn(&self) -> StoreResult<PooledConn> {
        self.pool.get().map_err(StoreError::from)
    }
}

fn encode_vector(vector: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vector.len() * 4);
    for value in vector {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

fn decode_vector(bytes: &[u8], dimensions: usize) -> Vec<f32> {
    bytes
        .chunks(4)
        .take(dimensions)
        .map(|b| {
            if b.len() == 4 {
                f32::from_le_bytes([b[0], b[1], b[2], b[3]])
            } else {
                0.0
            }
        })
        .collect()
}

#[async_trait]
impl VectorIndex for SqliteIndex {
    async fn upsert(&self, records: &[ChunkRecord]) -> Result<(), StoreError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let now = Utc::now().to_rfc3339();

        for record in records {
            tx.execute(
                r#"
                INSERT INTO chunks (id, content, vector, dimensions, metadata, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(id) DO UPDATE SET
                    content = excluded.content,
                    vector = excluded.vector,
                    dimensions = excluded.dimensions,
                    metadata = excluded.metadata,
                    updated_at = excluded.updated_at
                "#,
                params![
                    record.id,
                    record.text,
                    encode_vector(&record.embedding),
                    record.embedding.len() as i64,
                    serde_json::to_string(&record.metadata)?,
                    now,
                ],
            )?;
        }

        tx.commit()?;
        debug!("Upserted {} records", records.len());
        Ok(())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    async fn get(&self, limit: usize, offset: usize) -> Result<Vec<StoredChunk>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, content, metadata FROM chunks ORDER BY id LIMIT ?1 OFFSET ?2",
        )?;

        let rows = stmt.query_map(params![limit as i64, offset as i64], |row| {
            let id: String = row.get(0)?;
            let text: String = row.get(1)?;
            let metadata: String = row.get(2)?;
            Ok((id, text, metadata))
        })?;

        let mut chunks = Vec::new();
        for row in rows {
            let (id, text, metadata) = row?;
            chunks.push(StoredChunk {
                id,
                text,
                metadata: serde_json::from_str(&metadata)?,
            });
        }
        Ok(chunks)
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<ChunkMatch>, StoreError> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT id, content, metadata, vector, dimensions FROM chunks")?;

        let rows = stmt.query_map([], |row| {
            let id: String = row.get(0)?;
            let text: String = row.get(1)?;
            let metadata: String = row.get(2)?;
            let bytes: Vec<u8> = row.get(3)?;
            let dimensions: i64 = row.get(4)?;
            Ok((id, text, metadata, bytes, dimensions))
        })?;

        let mut matches = Vec::new();
        for row in rows {
            let (id, text, metadata, bytes, dimensions) = row?;
            let embedding = decode_vector(&bytes, dimensions as usize);
            matches.push(ChunkMatch {
                id,
                text,
                metadata: serde_json::from_str(&metadata)?,
                score: cosine_similarity(vector, &embedding),
            });
        }

        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(top_k);
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, embedding: Vec<f32>) -> ChunkRecord {
        ChunkRecord {
            id: id.to_string(),
            text: format!("text for {}", id),
            embedding,
            metadata: serde_json::json!({ "file_name": "a.txt", "chunk_index": 0 }),
        }
    }

    #[test]
    fn test_vector_encoding_round_trip() {
        let vector = vec![0.5, -1.25, 3.0];
        let decoded = decode_vector(&encode_vector(&vector), 3);
        assert_eq!(decoded, vector);
    }

    #[tokio::test]
    async fn test_upsert_and_count() {
        let index = SqliteIndex::open_in_memory().unwrap();
        index
            .upsert(&[record("a", vec![1.0, 0.0]), record("b", vec![0.0, 1.0])])
            .await
            .unwrap();
        assert_eq!(index.count().await.unwrap(), 2);

        // Same ids overwrite rather than duplicate.
        index.upsert(&[record("a", vec![0.5, 0.5])]).await.unwrap();
        assert_eq!(index.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_get_paginates() {
        let index = SqliteIndex::open_in_memory().unwrap();
        index
            .upsert(&[
                record("a", vec![1.0]),
                record("b", vec![1.0]),
                record("c", vec![1.0]),
            ])
            .await
            .unwrap();

        let page = index.get(2, 1).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id, "b");
        assert_eq!(page[1].id, "c");
        assert_eq!(page[0].metadata["file_name"], "a.txt");
    }

    #[tokio::test]
    async fn test_query_returns_best_matches_first() {
        let index = SqliteIndex::open_in_memory().unwrap();
        index
            .upsert(&[
                record("x", vec![1.0, 0.0]),
                record("y", vec![0.0, 1.0]),
                record("z", vec![0.9, 0.1]),
            ])
            .await
            .unwrap();

        let matches = index.query(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(matches[0].id, "x");
        assert_eq!(matches[1].id, "z");
    }
}
