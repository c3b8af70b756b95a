//! Generation pipeline
//!
//! `aggregate` runs collection → normalization → catalog build. `generate`
//! additionally hands the in-memory catalog straight to the category, stats
//! and page stages. The standalone stage entry points (`categories`,
//! `stats`, `pages`) instead read `index.json` back from disk.

use futures::StreamExt;
use serde::Serialize;
use tracing::{info, warn};
use wyrd_common::artifact_io::read_json;
use wyrd_common::{ApiLayout, CatalogArtifact, CategoriesArtifact, StatsArtifact};

use crate::catalog::{CatalogBuilder, RunSummary};
use crate::collector::{self, SourceCollector};
use crate::error::{AggregateError, AggregateResult};
use crate::normalizer::normalize;
use crate::pages::PageRenderer;
use crate::{categories, stats};

/// Outcome of a full `generate` run
#[derive(Debug, Clone, Serialize)]
pub struct GenerateReport {
    pub summary: RunSummary,
    pub categories: usize,
    pub pages: usize,
}

/// One configured generation run
pub struct Pipeline {
    collector: Box<dyn SourceCollector>,
    layout: ApiLayout,
    version: String,
}

impl Pipeline {
    pub fn new(collector: Box<dyn SourceCollector>, layout: ApiLayout, version: impl Into<String>) -> Self {
        Self {
            collector,
            layout,
            version: version.into(),
        }
    }

    pub fn layout(&self) -> &ApiLayout {
        &self.layout
    }

    /// Collect every source, normalize successes, and write the catalog
    ///
    /// Per-source failures are logged and counted; only a listing failure or
    /// an output write failure aborts.
    pub async fn aggregate(&self) -> AggregateResult<(CatalogArtifact, RunSummary)> {
        info!(strategy = self.collector.kind(), "Starting API aggregation...");

        let mut builder = CatalogBuilder::new(self.layout.clone(), self.version.clone());
        let items = collector::collect(self.collector.as_ref()).await?;
        futures::pin_mut!(items);

        while let Some(item) = items.next().await {
            match item.document {
                Ok(raw) => {
                    let record = normalize(&raw, &item.source_id);
                    tracing::debug!(source_id = %item.source_id, id = %record.id, "✓ normalized");
                    builder.push(&item.source_id, record)?;
                }
                Err(e) => {
                    warn!(source_id = %item.source_id, "✗ {}", e);
                    builder.record_failure();
                }
            }
        }

        let (catalog, summary) = builder.finish(wyrd_common::time::now())?;
        info!("Aggregation complete!");
        info!("{}", summary);
        Ok((catalog, summary))
    }

    /// Full run with in-memory handoff to the downstream stages
    pub async fn generate(&self, renderer: &PageRenderer) -> AggregateResult<GenerateReport> {
        let (catalog, summary) = self.aggregate().await?;

        let categories = categories::write_categories(&self.layout, &catalog)?;
        stats::write_stats(&self.layout, &catalog)?;
        let pages = renderer.write_pages(&self.layout, &catalog)?;

        info!("✅ All generation complete!");
        Ok(GenerateReport {
            summary,
            categories: categories.total,
            pages,
        })
    }
}

/// Read `index.json` back for the file-based stage entry points
pub fn load_catalog(layout: &ApiLayout) -> AggregateResult<CatalogArtifact> {
    let path = layout.index_path();
    read_json(&path).map_err(|e| AggregateError::from_artifact_read(path, e))
}

/// `categories` stage from disk
pub fn regenerate_categories(layout: &ApiLayout) -> AggregateResult<CategoriesArtifact> {
    info!("Generating categories...");
    let catalog = load_catalog(layout)?;
    categories::write_categories(layout, &catalog)
}

/// `stats` stage from disk
pub fn regenerate_stats(layout: &ApiLayout) -> AggregateResult<StatsArtifact> {
    info!("Generating stats...");
    let catalog = load_catalog(layout)?;
    stats::write_stats(layout, &catalog)
}

/// `pages` stage from disk
pub fn regenerate_pages(layout: &ApiLayout, renderer: &PageRenderer) -> AggregateResult<usize> {
    info!("Generating static pages...");
    let catalog = load_catalog(layout)?;
    renderer.write_pages(layout, &catalog)
}
