//! In-memory scan job registry shared across pollers and scan tasks.

use localmind_core::{JobId, ScanJob};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Registry of every scan job created in this process.
///
/// Jobs are never evicted; they stay around for later status polling.
/// Each job's fields are written only by the single task executing that
/// scan; the lock guards the map itself against concurrent insert and
/// lookup from request handlers.
#[derive(Clone, Default)]
pub struct JobRegistry {
    jobs: Arc<RwLock<HashMap<JobId, ScanJob>>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new pending job for the folder and return its snapshot.
    pub fn create(&self, folder_id: &str) -> ScanJob {
        let job = ScanJob::new(folder_id.to_string());
        let mut jobs = self.jobs.write().expect("job registry lock poisoned");
        jobs.insert(job.id.clone(), job.clone());
        job
    }

    /// Snapshot of one job.
    pub fn get(&self, id: &str) -> Option<ScanJob> {
        let jobs = self.jobs.read().expect("job registry lock poisoned");
        jobs.get(id).cloned()
    }

    /// Snapshots of all jobs, optionally filtered by folder id.
    pub fn list(&self, folder_id: Option<&str>) -> Vec<ScanJob> {
        let jobs = self.jobs.read().expect("job registry lock poisoned");
        let mut items: Vec<ScanJob> = jobs
            .values()
            .filter(|job| folder_id.map(|f| job.folder_id == f).unwrap_or(true))
            .cloned()
            .collect();
        items.sort_by(|a, b| a.started_at.cmp(&b.started_at));
        items
    }

    /// Mutate one job under the lock. Missing ids are ignored.
    pub fn update<F: FnOnce(&mut ScanJob)>(&self, id: &str, f: F) {
        let mut jobs = self.jobs.write().expect("job registry lock poisoned");
        if let Some(job) = jobs.get_mut(id) {
            f(job);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use localmind_core::ScanStatus;

    #[test]
    fn test_create_and_get() {
        let registry = JobRegistry::new();
        let job = registry.create("folder-1");

        let fetched = registry.get(&job.id).unwrap();
        assert_eq!(fetched.id, job.id);
        assert_eq!(fetched.folder_id, "folder-1");
        assert_eq!(fetched.status, ScanStatus::Pending);

        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_list_filters_by_folder() {
        let registry = JobRegistry::new();
        registry.create("a");
        registry.create("a");
        registry.create("b");

        assert_eq!(registry.list(None).len(), 3);
        assert_eq!(registry.list(Some("a")).len(), 2);
        assert_eq!(registry.list(Some("c")).len(), 0);
    }

    #[test]
    fn test_update_mutates_snapshot() {
        let registry = JobRegistry::new();
        let job = registry.create("a");

        registry.update(&job.id, |j| {
            j.status = ScanStatus::Running;
            j.total_files = 7;
        });

        let fetched = registry.get(&job.id).unwrap();
        assert_eq!(fetched.status, ScanStatus::Running);
        assert_eq!(fetched.total_files, 7);

        // Unknown ids are a no-op.
        registry.update("missing", |j| j.total_files = 99);
    }
}
