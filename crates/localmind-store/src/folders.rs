//! Folder registry with JSON snapshot persistence.

use crate::error::{StoreError, StoreResult};
use chrono::{DateTime, Utc};
use localmind_core::{FolderConfig, ScanStatus};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{info, warn};

/// Durable mapping of folder id to filesystem path and last-scan metadata.
///
/// The full config set is rewritten to one JSON file on every mutation, so
/// a crash right after a successful call cannot lose that call's effect.
/// The mutex serializes every load-mutate-persist section; without it two
/// near-simultaneous snapshot writes could silently lose one update.
///
/// Persistence failures are logged and swallowed: the in-memory set stays
/// authoritative for the rest of the process lifetime.
pub struct FolderStore {
    path: PathBuf,
    folders: Mutex<HashMap<String, FolderConfig>>,
}

impl FolderStore {
    /// Open the store, reloading any previously persisted configs.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let folders = Self::load(&path);
        info!(
            "Opened folder store at {} ({} folders)",
            path.display(),
            folders.len()
        );

        Self {
            path,
            folders: Mutex::new(folders),
        }
    }

    fn load(path: &Path) -> HashMap<String, FolderConfig> {
        if !path.exists() {
            return HashMap::new();
        }

        match std::fs::read_to_string(path)
            .map_err(StoreError::from)
            .and_then(|raw| serde_json::from_str(&raw).map_err(StoreError::from))
        {
            Ok(folders) => folders,
            Err(e) => {
                warn!("Failed to load folder configs from {}: {}", path.display(), e);
                HashMap::new()
            }
        }
    }

    fn persist(&self, folders: &HashMap<String, FolderConfig>) {
        let result = serde_json::to_string_pretty(folders)
            .map_err(StoreError::from)
            .and_then(|raw| {
                if let Some(parent) = self.path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&self.path, raw).map_err(StoreError::from)
            });

        if let Err(e) = result {
            warn!("Failed to persist folder configs: {}", e);
        }
    }

    /// Register a directory for scanning.
    ///
    /// The path is normalized to an absolute form first; anything that is
    /// not an existing directory fails with `InvalidPath` and nothing is
    /// stored.
    pub fn register(&self, name: &str, path: &str) -> StoreResult<FolderConfig> {
        let absolute = std::fs::canonicalize(path)
            .map_err(|_| StoreError::InvalidPath(path.to_string()))?;
        if !absolute.is_dir() {
            return Err(StoreError::InvalidPath(path.to_string()));
        }

        let config = FolderConfig::new(name, absolute.to_string_lossy());

        let mut folders = self.folders.lock().expect("folder store lock poisoned");
        folders.insert(config.id.clone(), config.clone());
        self.persist(&folders);

        info!("Registered folder {} -> {}", config.name, config.path);
        Ok(config)
    }

    /// List all configs, optionally filtered by a case-insensitive
    /// substring match against name or path.
    pub fn list(&self, filter: Option<&str>) -> Vec<FolderConfig> {
        let folders = self.folders.lock().expect("folder store lock poisoned");
        let mut items: Vec<FolderConfig> = match filter {
            Some(q) => {
                let q = q.to_lowercase();
                folders
                    .values()
                    .filter(|cfg| {
                        cfg.name.to_lowercase().contains(&q)
                            || cfg.path.to_lowercase().contains(&q)
                    })
                    .cloned()
                    .collect()
            }
            None => folders.values().cloned().collect(),
        };
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        items
    }

    /// Look up one folder config by id.
    pub fn get(&self, id: &str) -> StoreResult<FolderConfig> {
        let folders = self.folders.lock().expect("folder store lock poisoned");
        folders
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Remove a folder config.
    ///
    /// Only the configuration record is deleted; vectors already indexed
    /// for the folder are left alone.
    pub fn remove(&self, id: &str) -> StoreResult<()> {
        let mut folders = self.folders.lock().expect("folder store lock poisoned");
        if folders.remove(id).is_none() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.persist(&folders);
        info!("Removed folder config {}", id);
        Ok(())
    }

    /// Record the outcome of the most recent scan on the folder.
    pub fn record_scan_result(
        &self,
        id: &str,
        timestamp: DateTime<Utc>,
        status: ScanStatus,
        job_id: &str,
    ) -> StoreResult<()> {
        let mut folders = self.folders.lock().expect("folder store lock poisoned");
        let config = folders
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        config.last_scan_at = Some(timestamp);
        config.last_scan_status = Some(status);
        config.last_scan_job_id = Some(job_id.to_string());
        self.persist(&folders);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_in(dir: &Path) -> FolderStore {
        FolderStore::open(dir.join("folders.json"))
    }

    #[test]
    fn test_register_and_get() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());

        let docs = dir.path().join("docs");
        std::fs::create_dir(&docs).unwrap();

        let config = store.register("Docs", docs.to_str().unwrap()).unwrap();
        let fetched = store.get(&config.id).unwrap();

        assert_eq!(fetched.id, config.id);
        assert_eq!(fetched.name, "Docs");
        assert_eq!(fetched.path, config.path);
        assert!(Path::new(&fetched.path).is_absolute());
    }

    #[test]
    fn test_register_rejects_non_directories() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());

        let file = dir.path().join("file.txt");
        std::fs::write(&file, "hi").unwrap();

        assert!(matches!(
            store.register("f", file.to_str().unwrap()),
            Err(StoreError::InvalidPath(_))
        ));
        assert!(matches!(
            store.register("g", "/no/such/dir/anywhere"),
            Err(StoreError::InvalidPath(_))
        ));
        assert!(store.list(None).is_empty());
    }

    #[test]
    fn test_list_filter_matches_name_or_path() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());

        let notes = dir.path().join("notes");
        let work = dir.path().join("work");
        std::fs::create_dir(&notes).unwrap();
        std::fs::create_dir(&work).unwrap();

        store.register("Personal Notes", notes.to_str().unwrap()).unwrap();
        store.register("Projects", work.to_str().unwrap()).unwrap();

        assert_eq!(store.list(None).len(), 2);
        assert_eq!(store.list(Some("NOTES")).len(), 1);
        assert_eq!(store.list(Some("work")).len(), 1);
        assert!(store.list(Some("missing")).is_empty());
    }

    #[test]
    fn test_remove() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());

        let docs = dir.path().join("docs");
        std::fs::create_dir(&docs).unwrap();
        let config = store.register("Docs", docs.to_str().unwrap()).unwrap();

        store.remove(&config.id).unwrap();
        assert!(matches!(store.get(&config.id), Err(StoreError::NotFound(_))));
        assert!(matches!(store.remove(&config.id), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_persistence_round_trip() {
        let dir = tempdir().unwrap();
        let docs = dir.path().join("docs");
        std::fs::create_dir(&docs).unwrap();

        let (id, created_at) = {
            let store = store_in(dir.path());
            let a = store.register("A", docs.to_str().unwrap()).unwrap();
            let b = store.register("B", docs.to_str().unwrap()).unwrap();
            store.remove(&b.id).unwrap();
            (a.id, a.created_at)
        };

        let reloaded = store_in(dir.path());
        let configs = reloaded.list(None);
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].id, id);
        assert_eq!(configs[0].created_at, created_at);
    }

    #[test]
    fn test_record_scan_result() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());

        let docs = dir.path().join("docs");
        std::fs::create_dir(&docs).unwrap();
        let config = store.register("Docs", docs.to_str().unwrap()).unwrap();

        let when = Utc::now();
        store
            .record_scan_result(&config.id, when, ScanStatus::Completed, "job-1")
            .unwrap();

        let fetched = store.get(&config.id).unwrap();
        assert_eq!(fetched.last_scan_at, Some(when));
        assert_eq!(fetched.last_scan_status, Some(ScanStatus::Completed));
        assert_eq!(fetched.last_scan_job_id.as_deref(), Some("job-1"));

        assert!(matches!(
            store.record_scan_result("nope", when, ScanStatus::Completed, "job-2"),
            Err(StoreError::NotFound(_))
        ));
    }
}
