//! Local directory collector
//!
//! Every immediate sub-directory of the source root is one source; its raw
//! document is `{dir}/{document}` (normally `api.json`). Listing is sorted
//! by directory name so repeated runs see sources in the same order.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{CollectError, Exclusions, RawDocument, SourceCollector};

/// Collector reading sibling source directories
pub struct LocalDirCollector {
    root: PathBuf,
    document: String,
    exclusions: Exclusions,
}

impl LocalDirCollector {
    /// Hidden directories are always excluded in addition to `exclusions`
    pub fn new(root: impl Into<PathBuf>, document: impl Into<String>, exclusions: Exclusions) -> Self {
        Self {
            root: root.into(),
            document: document.into(),
            exclusions: exclusions.with_hidden_skipped(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn document_path(&self, source_id: &str) -> PathBuf {
        self.root.join(source_id).join(&self.document)
    }
}

#[async_trait]
impl SourceCollector for LocalDirCollector {
    fn kind(&self) -> &'static str {
        "local"
    }

    async fn list_sources(&self) -> Result<Vec<String>, CollectError> {
        if !self.root.is_dir() {
            return Err(CollectError::ListingFailed(format!(
                "not a directory: {}",
                self.root.display()
            )));
        }

        let mut names = Vec::new();
        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        for entry in walker {
            match entry {
                Ok(entry) => {
                    if !entry.file_type().is_dir() {
                        continue;
                    }
                    let name = entry.file_name().to_string_lossy().to_string();
                    if self.exclusions.excludes(&name) {
                        tracing::debug!(source_id = %name, "Excluded source directory");
                        continue;
                    }
                    names.push(name);
                }
                Err(e) => {
                    // Continue listing, an unreadable entry is not a source
                    tracing::warn!("Error accessing entry: {}", e);
                }
            }
        }

        Ok(names)
    }

    async fn fetch(&self, source_id: &str) -> Result<RawDocument, CollectError> {
        let path = self.document_path(source_id);

        let bytes = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => {
                CollectError::unavailable(source_id, format!("{} not found", path.display()))
            }
            _ => CollectError::unavailable(source_id, format!("{}: {}", path.display(), e)),
        })?;

        serde_json::from_slice(&bytes).map_err(|e| CollectError::malformed(source_id, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_source(root: &Path, name: &str, body: &str) {
        fs::create_dir_all(root.join(name)).unwrap();
        fs::write(root.join(name).join("api.json"), body).unwrap();
    }

    fn collector(root: &Path) -> LocalDirCollector {
        LocalDirCollector::new(
            root,
            "api.json",
            Exclusions::new(vec!["wyrdness.github.io".to_string(), "node_modules".to_string()]),
        )
    }

    #[tokio::test]
    async fn test_lists_sorted_directories_without_exclusions() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_source(root, "mothman", "{}");
        write_source(root, "bigfoot", "{}");
        fs::create_dir_all(root.join("wyrdness.github.io")).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::create_dir_all(root.join("node_modules")).unwrap();
        fs::write(root.join("README.txt"), "not a source").unwrap();

        let names = collector(root).list_sources().await.unwrap();
        assert_eq!(names, vec!["bigfoot".to_string(), "mothman".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_document_is_unavailable() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("empty")).unwrap();

        let result = collector(temp_dir.path()).fetch("empty").await;
        assert!(matches!(result, Err(CollectError::SourceUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_invalid_json_is_malformed() {
        let temp_dir = TempDir::new().unwrap();
        write_source(temp_dir.path(), "broken", "{ \"name\": ");

        let result = collector(temp_dir.path()).fetch("broken").await;
        match result {
            Err(CollectError::MalformedSource { source_id, .. }) => assert_eq!(source_id, "broken"),
            other => panic!("Expected MalformedSource, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_root_fails_listing() {
        let result = collector(Path::new("/nonexistent/wyrd/root")).list_sources().await;
        assert!(matches!(result, Err(CollectError::ListingFailed(_))));
    }
}
