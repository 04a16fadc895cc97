//! File discovery and extension filtering.

use localmind_config::ScanConfig;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Which files under a folder are eligible for ingestion.
///
/// A file is excluded when its lowercase name ends with any ignored
/// suffix; those are compound formats that look like text but are not
/// (Excalidraw exports in particular). Otherwise it is included only when
/// its extension is in the allow-list.
#[derive(Debug, Clone)]
pub struct DiscoveryPolicy {
    /// Allowed extensions, lowercase, with leading dot.
    pub supported_extensions: Vec<String>,
    /// File name suffixes to skip, lowercase.
    pub ignored_suffixes: Vec<String>,
}

impl DiscoveryPolicy {
    pub fn from_scan_config(config: &ScanConfig) -> Self {
        Self {
            supported_extensions: config
                .supported_extensions
                .iter()
                .map(|e| e.to_lowercase())
                .collect(),
            ignored_suffixes: config
                .ignored_suffixes
                .iter()
                .map(|s| s.to_lowercase())
                .collect(),
        }
    }

    fn matches(&self, file_name: &str) -> bool {
        let lower = file_name.to_lowercase();

        if self.ignored_suffixes.iter().any(|s| lower.ends_with(s)) {
            return false;
        }

        let ext = match lower.rsplit_once('.') {
            Some((_, ext)) => format!(".{}", ext),
            None => return false,
        };
        self.supported_extensions.contains(&ext)
    }
}

impl Default for DiscoveryPolicy {
    fn default() -> Self {
        Self::from_scan_config(&ScanConfig::default())
    }
}

/// Recursively collect all eligible files under `root`.
///
/// Walk order is whatever the filesystem yields; callers must not rely
/// on it being sorted.
pub fn discover(root: &Path, policy: &DiscoveryPolicy) -> Vec<PathBuf> {
    let files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .map(|name| policy.matches(name))
                .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    debug!("Discovered {} files under {}", files.len(), root.display());
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_policy_extension_allow_list() {
        let policy = DiscoveryPolicy::default();
        assert!(policy.matches("notes.txt"));
        assert!(policy.matches("README.md"));
        assert!(policy.matches("UPPER.MARKDOWN"));
        assert!(!policy.matches("image.png"));
        assert!(!policy.matches("archive.tar.gz"));
        assert!(!policy.matches("no_extension"));
    }

    #[test]
    fn test_policy_ignored_suffixes_win() {
        let policy = DiscoveryPolicy::default();
        // Markdown-shaped Excalidraw exports must not be ingested.
        assert!(!policy.matches("diagram.excalidraw.md"));
        assert!(!policy.matches("diagram.excalidraw"));
        assert!(!policy.matches("Sketch.EXCALIDRAW.MD"));
    }

    #[test]
    fn test_discover_walks_recursively() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();

        std::fs::write(dir.path().join("top.txt"), "x").unwrap();
        std::fs::write(nested.join("deep.md"), "y").unwrap();
        std::fs::write(nested.join("skip.excalidraw.md"), "z").unwrap();
        std::fs::write(dir.path().join("binary.bin"), [0u8]).unwrap();

        let mut found = discover(dir.path(), &DiscoveryPolicy::default());
        found.sort();

        assert_eq!(found.len(), 2);
        assert!(found[0].ends_with("a/b/deep.md"));
        assert!(found[1].ends_with("top.txt"));
    }

    #[test]
    fn test_discover_empty_when_nothing_matches() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("photo.jpg"), "x").unwrap();

        let found = discover(dir.path(), &DiscoveryPolicy::default());
        assert!(found.is_empty());
    }
}
