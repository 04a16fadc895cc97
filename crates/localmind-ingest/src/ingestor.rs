//! Scan orchestration: job submission, the per-file pipeline, and direct
//! text ingestion.

use crate::chunker::chunk_text;
use crate::discovery::{discover, DiscoveryPolicy};
use crate::error::{IngestError, IngestResult};
use crate::providers::{Embedder, Enricher};
use crate::registry::JobRegistry;
use chrono::{DateTime, Datelike, Utc};
use localmind_config::ScanConfig;
use localmind_core::{
    chunk_id, document_id, new_id, ChunkMetadata, ChunkRecord, FolderConfig, ScanJob, ScanStatus,
};
use localmind_store::{FolderStore, StoreError, VectorIndex};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Outcome of a direct text ingestion.
#[derive(Debug, Clone)]
pub struct TextIngestOutcome {
    pub doc_id: String,
    pub chunks: usize,
}

/// Drives folder scans end to end.
///
/// A scan runs as one background task with no internal parallelism across
/// files; that keeps `processed_files` strictly monotonic and bounds the
/// load put on the embedding API. Concurrent scans (including two for the
/// same folder) run as independent tasks, bounded by a semaphore.
#[derive(Clone)]
pub struct Ingestor {
    folders: Arc<FolderStore>,
    index: Arc<dyn VectorIndex>,
    enricher: Arc<dyn Enricher>,
    embedder: Arc<dyn Embedder>,
    registry: JobRegistry,
    policy: DiscoveryPolicy,
    chunk_max_chars: usize,
    permits: Arc<Semaphore>,
}

impl Ingestor {
    pub fn new(
        folders: Arc<FolderStore>,
        index: Arc<dyn VectorIndex>,
        enricher: Arc<dyn Enricher>,
        embedder: Arc<dyn Embedder>,
        config: &ScanConfig,
    ) -> Self {
        Self {
            folders,
            index,
            enricher,
            embedder,
            registry: JobRegistry::new(),
            policy: DiscoveryPolicy::from_scan_config(config),
            chunk_max_chars: config.chunk_max_chars,
            permits: Arc::new(Semaphore::new(config.max_concurrent_scans.max(1))),
        }
    }

    /// The job registry, for polling scan state.
    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    /// Snapshot of one scan job.
    pub fn job(&self, id: &str) -> IngestResult<ScanJob> {
        self.registry
            .get(id)
            .ok_or_else(|| IngestError::JobNotFound(id.to_string()))
    }

    /// Snapshots of all scan jobs, optionally filtered by folder.
    pub fn jobs(&self, folder_id: Option<&str>) -> Vec<ScanJob> {
        self.registry.list(folder_id)
    }

    /// Request a scan of the folder.
    ///
    /// Returns the pending job snapshot immediately together with the
    /// handle of the background task executing it. The task waits for a
    /// semaphore permit, so the number of scans running at once stays
    /// bounded.
    pub fn submit(&self, folder_id: &str) -> IngestResult<(ScanJob, JoinHandle<()>)> {
        // Fail fast on unknown folders; the pending -> error transition is
        // reserved for folders that disappear before the task runs.
        match self.folders.get(folder_id) {
            Ok(_) => {}
            Err(StoreError::NotFound(id)) => return Err(IngestError::FolderNotFound(id)),
            Err(e) => return Err(e.into()),
        }

        let job = self.registry.create(folder_id);
        info!("Submitted scan job {} for folder {}", job.id, folder_id);

        let ingestor = self.clone();
        let job_id = job.id.clone();
        let handle = tokio::spawn(async move {
            let _permit = ingestor
                .permits
                .clone()
                .acquire_owned()
                .await
                .expect("scan semaphore closed");
            ingestor.run_scan(&job_id).await;
        });

        Ok((job, handle))
    }

    /// Execute one scan job to its terminal state.
    async fn run_scan(&self, job_id: &str) {
        let job = match self.registry.get(job_id) {
            Some(job) => job,
            None => return,
        };

        let folder = match self.folders.get(&job.folder_id) {
            Ok(folder) => folder,
            Err(_) => {
                self.fail_job(job_id, "Folder config not found".to_string());
                return;
            }
        };

        let base = Path::new(&folder.path);
        if !base.is_dir() {
            self.fail_job(job_id, format!("Directory missing: {}", folder.path));
            return;
        }

        self.registry
            .update(job_id, |j| j.status = ScanStatus::Running);

        let files = discover(base, &self.policy);
        let total = files.len();
        self.registry.update(job_id, |j| j.total_files = total);
        info!("Scan {}: {} files to process", job_id, total);

        for (idx, path) in files.iter().enumerate() {
            if let Err(e) = self.process_file(&folder, base, path).await {
                warn!("Scan {}: {} failed: {}", job_id, path.display(), e);
                let message = format!("{}: {}", path.display(), e);
                self.registry
                    .update(job_id, |j| j.error_message = Some(message));
            }
            // Progress is the sole signal pollers see; it advances after
            // every attempt, failures included.
            self.registry
                .update(job_id, |j| j.processed_files = idx + 1);
        }

        let finished = Utc::now();
        self.registry.update(job_id, |j| {
            j.status = ScanStatus::Completed;
            j.finished_at = Some(finished);
        });

        if let Err(e) =
            self.folders
                .record_scan_result(&folder.id, finished, ScanStatus::Completed, job_id)
        {
            warn!("Scan {}: failed to record result on folder: {}", job_id, e);
        }

        info!("Scan {} completed ({} files)", job_id, total);
    }

    fn fail_job(&self, job_id: &str, message: String) {
        warn!("Scan {} aborted: {}", job_id, message);
        self.registry.update(job_id, |j| {
            j.status = ScanStatus::Error;
            j.error_message = Some(message);
            j.finished_at = Some(Utc::now());
        });
    }

    /// Run one file through read -> enrich -> chunk -> embed -> upsert.
    ///
    /// Empty files and files yielding no chunks are skipped without
    /// touching the collaborators.
    async fn process_file(
        &self,
        folder: &FolderConfig,
        base: &Path,
        path: &Path,
    ) -> IngestResult<()> {
        let bytes = tokio::fs::read(path).await?;
        let text = String::from_utf8_lossy(&bytes).into_owned();
        if text.trim().is_empty() {
            debug!("Skipping empty file {}", path.display());
            return Ok(());
        }

        let rel_path = path
            .strip_prefix(base)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string();
        let doc_id = document_id(&folder.id, &rel_path);

        let digest = self.enricher.digest(&text).await?;

        let metadata = tokio::fs::metadata(path).await?;
        let modified: DateTime<Utc> = metadata.modified()?.into();

        let chunks = chunk_text(&text, self.chunk_max_chars);
        if chunks.is_empty() {
            debug!("No chunks for {}", path.display());
            return Ok(());
        }

        let embeddings = self.embedder.embed(&chunks).await?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| rel_path.clone());
        let doc_keywords = serde_json::to_string(&digest.keywords)?;

        let records: Vec<ChunkRecord> = chunks
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(i, (text, embedding))| {
                let metadata = ChunkMetadata {
                    folder_id: folder.id.clone(),
                    folder_name: folder.name.clone(),
                    file_path: rel_path.clone(),
                    file_name: file_name.clone(),
                    chunk_index: i,
                    doc_summary: digest.summary.clone(),
                    doc_keywords: doc_keywords.clone(),
                    file_modified_at: modified,
                    year: modified.year(),
                    month: modified.month(),
                };
                Ok(ChunkRecord {
                    id: chunk_id(&doc_id, i),
                    text,
                    embedding,
                    metadata: serde_json::to_value(metadata)?,
                })
            })
            .collect::<IngestResult<Vec<_>>>()?;

        self.index.upsert(&records).await?;
        debug!("Indexed {} chunks for {}", records.len(), doc_id);
        Ok(())
    }

    /// Ingest a single piece of raw text outside any folder scan.
    ///
    /// Chunks are embedded and written under `{doc_id}_{i}` ids; the
    /// caller may pin the document id to overwrite a previous ingest.
    pub async fn ingest_text(
        &self,
        text: &str,
        doc_id: Option<String>,
        title: Option<String>,
    ) -> IngestResult<TextIngestOutcome> {
        if text.trim().is_empty() {
            return Err(IngestError::InvalidInput("text must not be empty".to_string()));
        }

        let doc_id = doc_id.unwrap_or_else(new_id);
        let title = title
            .unwrap_or_else(|| format!("Doc-{}", doc_id.chars().take(8).collect::<String>()));

        let chunks = chunk_text(text, self.chunk_max_chars);
        let embeddings = self.embedder.embed(&chunks).await?;

        let records: Vec<ChunkRecord> = chunks
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(i, (text, embedding))| ChunkRecord {
                id: format!("{}_{}", doc_id, i),
                text,
                embedding,
                metadata: serde_json::json!({
                    "doc_id": doc_id,
                    "chunk_index": i,
                    "title": title,
                }),
            })
            .collect();

        self.index.upsert(&records).await?;
        info!("Ingested document {} ({} chunks)", doc_id, records.len());

        Ok(TextIngestOutcome {
            doc_id,
            chunks: records.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use localmind_core::DocumentDigest;
    use localmind_store::MemoryIndex;
    use tempfile::{tempdir, TempDir};

    struct StubEnricher {
        /// Fail for any document containing this marker.
        poison: Option<String>,
    }

    #[async_trait]
    impl Enricher for StubEnricher {
        async fn digest(&self, text: &str) -> IngestResult<DocumentDigest> {
            if let Some(poison) = &self.poison {
                if text.contains(poison.as_str()) {
                    return Err(IngestError::Processing("enrichment exploded".to_string()));
                }
            }
            Ok(DocumentDigest {
                summary: "stub summary".to_string(),
                keywords: vec!["alpha".to_string(), "beta".to_string()],
            })
        }
    }

    struct StubEmbedder;

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed(&self, texts: &[String]) -> IngestResult<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|t| vec![t.chars().count() as f32, 1.0])
                .collect())
        }
    }

    struct Fixture {
        _dir: TempDir,
        docs: std::path::PathBuf,
        folders: Arc<FolderStore>,
        index: Arc<MemoryIndex>,
        ingestor: Ingestor,
    }

    fn fixture(poison: Option<&str>) -> Fixture {
        let dir = tempdir().unwrap();
        let docs = dir.path().join("docs");
        std::fs::create_dir(&docs).unwrap();

        let folders = Arc::new(FolderStore::open(dir.path().join("folders.json")));
        let index = Arc::new(MemoryIndex::new());
        let ingestor = Ingestor::new(
            folders.clone(),
            index.clone(),
            Arc::new(StubEnricher {
                poison: poison.map(String::from),
            }),
            Arc::new(StubEmbedder),
            &ScanConfig::default(),
        );

        Fixture {
            _dir: dir,
            docs,
            folders,
            index,
            ingestor,
        }
    }

    async fn run_to_completion(fx: &Fixture, folder_id: &str) -> ScanJob {
        let (job, handle) = fx.ingestor.submit(folder_id).unwrap();
        assert_eq!(job.status, ScanStatus::Pending);
        handle.await.unwrap();
        fx.ingestor.job(&job.id).unwrap()
    }

    #[tokio::test]
    async fn test_scan_ingests_eligible_files_only() {
        let fx = fixture(None);
        std::fs::write(fx.docs.join("a.txt"), "hello world").unwrap();
        std::fs::write(fx.docs.join("b.excalidraw"), "{\"kind\": \"sketch\"}").unwrap();

        let folder = fx.folders.register("Docs", fx.docs.to_str().unwrap()).unwrap();
        let job = run_to_completion(&fx, &folder.id).await;

        assert_eq!(job.status, ScanStatus::Completed);
        assert_eq!(job.total_files, 1);
        assert_eq!(job.processed_files, 1);
        assert!(job.error_message.is_none());
        assert!(job.finished_at.is_some());

        assert_eq!(fx.index.count().await.unwrap(), 1);
        let stored = &fx.index.get(10, 0).await.unwrap()[0];
        assert_eq!(stored.id, format!("{}:a.txt::chunk_0", folder.id));
        assert_eq!(stored.text, "hello world");
        assert_eq!(stored.metadata["folder_name"], "Docs");
        assert_eq!(stored.metadata["file_name"], "a.txt");
        assert_eq!(stored.metadata["file_path"], "a.txt");
        assert_eq!(stored.metadata["chunk_index"], 0);
        assert_eq!(stored.metadata["doc_summary"], "stub summary");
        assert_eq!(stored.metadata["doc_keywords"], "[\"alpha\",\"beta\"]");

        let folder = fx.folders.get(&folder.id).unwrap();
        assert_eq!(folder.last_scan_status, Some(ScanStatus::Completed));
        assert_eq!(folder.last_scan_job_id.as_deref(), Some(job.id.as_str()));
        assert_eq!(folder.last_scan_at, job.finished_at);
    }

    #[tokio::test]
    async fn test_scan_with_no_eligible_files_completes_empty() {
        let fx = fixture(None);
        std::fs::write(fx.docs.join("photo.png"), [1u8, 2, 3]).unwrap();

        let folder = fx.folders.register("Docs", fx.docs.to_str().unwrap()).unwrap();
        let job = run_to_completion(&fx, &folder.id).await;

        assert_eq!(job.status, ScanStatus::Completed);
        assert_eq!(job.total_files, 0);
        assert_eq!(job.processed_files, 0);
        assert_eq!(fx.index.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_per_file_failure_is_isolated() {
        let fx = fixture(Some("POISON"));
        std::fs::write(fx.docs.join("good.txt"), "wholesome content").unwrap();
        std::fs::write(fx.docs.join("bad.txt"), "this one is POISON").unwrap();

        let folder = fx.folders.register("Docs", fx.docs.to_str().unwrap()).unwrap();
        let job = run_to_completion(&fx, &folder.id).await;

        // One bad file must not abort the scan.
        assert_eq!(job.status, ScanStatus::Completed);
        assert_eq!(job.total_files, 2);
        assert_eq!(job.processed_files, 2);
        let message = job.error_message.unwrap();
        assert!(message.contains("bad.txt"), "got: {}", message);

        let stored = fx.index.get(10, 0).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].metadata["file_name"], "good.txt");
    }

    #[tokio::test]
    async fn test_empty_file_skipped_but_counted() {
        let fx = fixture(None);
        std::fs::write(fx.docs.join("blank.txt"), "   \n\t ").unwrap();
        std::fs::write(fx.docs.join("real.txt"), "content").unwrap();

        let folder = fx.folders.register("Docs", fx.docs.to_str().unwrap()).unwrap();
        let job = run_to_completion(&fx, &folder.id).await;

        assert_eq!(job.status, ScanStatus::Completed);
        assert_eq!(job.total_files, 2);
        assert_eq!(job.processed_files, 2);
        assert!(job.error_message.is_none());
        assert_eq!(fx.index.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_long_document_produces_indexed_chunks() {
        let fx = fixture(None);
        std::fs::write(fx.docs.join("long.txt"), "a".repeat(1200)).unwrap();

        let folder = fx.folders.register("Docs", fx.docs.to_str().unwrap()).unwrap();
        let job = run_to_completion(&fx, &folder.id).await;

        assert_eq!(job.status, ScanStatus::Completed);
        assert_eq!(fx.index.count().await.unwrap(), 3);

        let mut ids: Vec<String> = fx
            .index
            .get(10, 0)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        ids.sort();
        for (i, id) in ids.iter().enumerate() {
            assert_eq!(*id, format!("{}:long.txt::chunk_{}", folder.id, i));
        }
    }

    #[tokio::test]
    async fn test_submit_unknown_folder_fails_fast() {
        let fx = fixture(None);
        assert!(matches!(
            fx.ingestor.submit("no-such-folder"),
            Err(IngestError::FolderNotFound(_))
        ));
        assert!(fx.ingestor.jobs(None).is_empty());
    }

    #[tokio::test]
    async fn test_missing_directory_aborts_before_processing() {
        let fx = fixture(None);
        let target = fx.docs.join("doomed");
        std::fs::create_dir(&target).unwrap();

        let folder = fx.folders.register("Doomed", target.to_str().unwrap()).unwrap();
        std::fs::remove_dir(&target).unwrap();

        let job = run_to_completion(&fx, &folder.id).await;

        assert_eq!(job.status, ScanStatus::Error);
        assert_eq!(job.total_files, 0);
        assert_eq!(job.processed_files, 0);
        assert!(job.finished_at.is_some());
        assert!(job.error_message.unwrap().contains("Directory missing"));
    }

    #[tokio::test]
    async fn test_rescan_overwrites_instead_of_duplicating() {
        let fx = fixture(None);
        std::fs::write(fx.docs.join("a.txt"), "stable content").unwrap();

        let folder = fx.folders.register("Docs", fx.docs.to_str().unwrap()).unwrap();
        run_to_completion(&fx, &folder.id).await;
        run_to_completion(&fx, &folder.id).await;

        assert_eq!(fx.index.count().await.unwrap(), 1);
        assert_eq!(fx.ingestor.jobs(Some(&folder.id)).len(), 2);
    }

    #[tokio::test]
    async fn test_ingest_text_directly() {
        let fx = fixture(None);

        let outcome = fx
            .ingestor
            .ingest_text(&"x".repeat(700), Some("doc-1".to_string()), None)
            .await
            .unwrap();

        assert_eq!(outcome.doc_id, "doc-1");
        assert_eq!(outcome.chunks, 2);

        let stored = fx.index.get(10, 0).await.unwrap();
        assert_eq!(stored[0].id, "doc-1_0");
        assert_eq!(stored[1].id, "doc-1_1");
        assert_eq!(stored[0].metadata["title"], "Doc-doc-1");

        assert!(matches!(
            fx.ingestor.ingest_text("   ", None, None).await,
            Err(IngestError::InvalidInput(_))
        ));
    }
}
