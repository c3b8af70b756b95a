//! Source collection
//!
//! A [`SourceCollector`] enumerates candidate sources and fetches one raw
//! document per source. Both strategies (local directory scan, remote
//! organisation listing) yield the same [`SourceItem`] shape, so the
//! normalizer never knows where a document came from.
//!
//! Sources are fetched one at a time, in listing order.

use async_trait::async_trait;
use futures::Stream;
use serde_json::Value;
use thiserror::Error;

pub mod local;
pub mod remote;

pub use local::LocalDirCollector;
pub use remote::GitHubCollector;

/// Unnormalized source document
pub type RawDocument = Value;

/// Source collection errors
#[derive(Debug, Error)]
pub enum CollectError {
    /// Document missing or unreadable (missing file, network failure, non-2xx)
    #[error("source '{source_id}' is unavailable: {reason}")]
    SourceUnavailable { source_id: String, reason: String },

    /// Document retrieved but not decodable as JSON
    #[error("source '{source_id}' is malformed: {reason}")]
    MalformedSource { source_id: String, reason: String },

    /// Candidate sources could not be enumerated; fatal to the run
    #[error("source listing failed: {0}")]
    ListingFailed(String),
}

impl CollectError {
    pub fn unavailable(source_id: &str, reason: impl ToString) -> Self {
        CollectError::SourceUnavailable {
            source_id: source_id.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn malformed(source_id: &str, reason: impl ToString) -> Self {
        CollectError::MalformedSource {
            source_id: source_id.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// One collected source: its tag and either its raw document or the failure
#[derive(Debug)]
pub struct SourceItem {
    pub source_id: String,
    pub document: Result<RawDocument, CollectError>,
}

/// Collection strategy
#[async_trait]
pub trait SourceCollector: Send + Sync {
    /// Strategy name for logging ("local", "remote")
    fn kind(&self) -> &'static str;

    /// Candidate source ids, exclusions already applied
    async fn list_sources(&self) -> Result<Vec<String>, CollectError>;

    /// Fetch and decode the raw document of one source
    async fn fetch(&self, source_id: &str) -> Result<RawDocument, CollectError>;
}

/// Deny-list of source names
#[derive(Debug, Clone, Default)]
pub struct Exclusions {
    names: Vec<String>,
    skip_hidden: bool,
}

impl Exclusions {
    pub fn new(names: impl IntoIterator<Item = String>) -> Self {
        Self {
            names: names.into_iter().collect(),
            skip_hidden: false,
        }
    }

    /// Also exclude any name starting with `.`
    pub fn with_hidden_skipped(mut self) -> Self {
        self.skip_hidden = true;
        self
    }

    pub fn excludes(&self, name: &str) -> bool {
        (self.skip_hidden && name.starts_with('.')) || self.names.iter().any(|n| n == name)
    }
}

/// Enumerate sources, then lazily fetch each one in order
///
/// Listing failure is returned up front; per-source failures are carried
/// inside the yielded items.
pub async fn collect<'a>(
    collector: &'a dyn SourceCollector,
) -> Result<impl Stream<Item = SourceItem> + Send + 'a, CollectError> {
    let source_ids = collector.list_sources().await?;
    tracing::info!(
        strategy = collector.kind(),
        "Found {} candidate sources",
        source_ids.len()
    );

    Ok(async_stream::stream! {
        for source_id in source_ids {
            let document = collector.fetch(&source_id).await;
            yield SourceItem { source_id, document };
        }
    })
}
