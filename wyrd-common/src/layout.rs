//! Generated file layout
//!
//! ```text
//! {site_root}/api/v1/{id}.json
//! {site_root}/api/v1/index.json
//! {site_root}/api/v1/categories.json
//! {site_root}/api/v1/stats.json
//! {site_root}/phenomena/{id}/index.html
//! ```

use std::path::{Path, PathBuf};

/// Endpoint of the combined catalog, relative to the API base
pub const INDEX_ENDPOINT: &str = "index.json";
/// Endpoint of the category summary
pub const CATEGORIES_ENDPOINT: &str = "categories.json";
/// Endpoint of the histogram summary
pub const STATS_ENDPOINT: &str = "stats.json";
/// URL prefix the API directory is published under
pub const API_BASE_PATH: &str = "/api/v1";

/// Endpoint of one per-record file
pub fn record_endpoint(id: &str) -> String {
    format!("{}.json", id)
}

/// Whether an id can be used as a single path segment
///
/// Rejects empty ids, separators, and parent/current directory references.
pub fn is_safe_id(id: &str) -> bool {
    !id.is_empty()
        && id != "."
        && id != ".."
        && !id.contains(['/', '\\'])
        && !id.contains('\0')
}

/// Paths of every generated artifact under one site root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiLayout {
    site_root: PathBuf,
}

impl ApiLayout {
    pub fn new(site_root: impl Into<PathBuf>) -> Self {
        Self {
            site_root: site_root.into(),
        }
    }

    pub fn site_root(&self) -> &Path {
        &self.site_root
    }

    /// `{site_root}` plus the segments of [`API_BASE_PATH`]
    pub fn api_dir(&self) -> PathBuf {
        API_BASE_PATH
            .split('/')
            .filter(|segment| !segment.is_empty())
            .fold(self.site_root.clone(), |dir, segment| dir.join(segment))
    }

    pub fn index_path(&self) -> PathBuf {
        self.api_dir().join(INDEX_ENDPOINT)
    }

    pub fn categories_path(&self) -> PathBuf {
        self.api_dir().join(CATEGORIES_ENDPOINT)
    }

    pub fn stats_path(&self) -> PathBuf {
        self.api_dir().join(STATS_ENDPOINT)
    }

    /// Per-record file; callers check [`is_safe_id`] first
    pub fn record_path(&self, id: &str) -> PathBuf {
        self.api_dir().join(record_endpoint(id))
    }

    pub fn pages_dir(&self) -> PathBuf {
        self.site_root.join("phenomena")
    }

    pub fn page_path(&self, id: &str) -> PathBuf {
        self.pages_dir().join(id).join("index.html")
    }
}
