//! Core domain types for LocalMind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for folder configurations.
pub type FolderId = String;

/// Unique identifier for scan jobs.
pub type JobId = String;

/// Generate a new unique ID.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Build the document id for a file inside a folder.
///
/// The id is stable across scans so re-ingesting an unchanged file
/// overwrites its vectors instead of duplicating them.
pub fn document_id(folder_id: &str, rel_path: &str) -> String {
    format!("{}:{}", folder_id, rel_path)
}

/// Build the vector-index id for one chunk of a document.
pub fn chunk_id(doc_id: &str, index: usize) -> String {
    format!("{}::chunk_{}", doc_id, index)
}

/// A registered directory watched for ingestable documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderConfig {
    pub id: FolderId,
    pub name: String,
    /// Absolute filesystem path. Immutable for the life of the config.
    pub path: String,
    pub created_at: DateTime<Utc>,
    pub last_scan_at: Option<DateTime<Utc>>,
    pub last_scan_status: Option<ScanStatus>,
    pub last_scan_job_id: Option<JobId>,
}

impl FolderConfig {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            path: path.into(),
            created_at: Utc::now(),
            last_scan_at: None,
            last_scan_status: None,
            last_scan_job_id: None,
        }
    }
}

/// Status of a scan job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Error,
}

impl ScanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanStatus::Pending => "pending",
            ScanStatus::Running => "running",
            ScanStatus::Completed => "completed",
            ScanStatus::Error => "error",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(ScanStatus::Pending),
            "running" => Some(ScanStatus::Running),
            "completed" => Some(ScanStatus::Completed),
            "error" => Some(ScanStatus::Error),
            _ => None,
        }
    }

    /// Whether the job has finished, successfully or not.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ScanStatus::Completed | ScanStatus::Error)
    }
}

impl std::fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One asynchronous run that ingests all eligible files under one folder.
///
/// Mutated exclusively by the background task executing the scan; pollers
/// only ever see snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanJob {
    pub id: JobId,
    pub folder_id: FolderId,
    pub status: ScanStatus,
    pub total_files: usize,
    pub processed_files: usize,
    /// Last error observed during the scan. Overwritten on each failure,
    /// only the most recent one is retained.
    pub error_message: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl ScanJob {
    pub fn new(folder_id: FolderId) -> Self {
        Self {
            id: new_id(),
            folder_id,
            status: ScanStatus::Pending,
            total_files: 0,
            processed_files: 0,
            error_message: None,
            started_at: Utc::now(),
            finished_at: None,
        }
    }
}

/// Document-level summary and keywords produced by enrichment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentDigest {
    pub summary: String,
    pub keywords: Vec<String>,
}

/// Metadata attached to every chunk written to the vector index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub folder_id: FolderId,
    pub folder_name: String,
    /// Path relative to the folder root.
    pub file_path: String,
    pub file_name: String,
    pub chunk_index: usize,
    pub doc_summary: String,
    /// Keyword list serialized as a JSON array string.
    pub doc_keywords: String,
    pub file_modified_at: DateTime<Utc>,
    pub year: i32,
    pub month: u32,
}

/// The unit written to the vector index: a bounded slice of a document's
/// text together with its embedding and metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub id: String,
    pub text: String,
    pub embedding: Vec<f32>,
    pub metadata: serde_json::Value,
}
