//! Catalog index builder
//!
//! Accepts normalized records one at a time, materializes `api/v1/{id}.json`
//! for each, and on [`CatalogBuilder::finish`] writes the combined
//! `api/v1/index.json`. Every run replaces the index wholesale; nothing is
//! merged from earlier runs.
//!
//! Duplicate ids are kept in the index, reported with a warning, and the
//! last record wins the per-id file.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use tracing::{info, warn};
use wyrd_common::artifact_io::write_json_atomic;
use wyrd_common::layout::is_safe_id;
use wyrd_common::{ApiLayout, CatalogArtifact, PhenomenonRecord};

use crate::error::AggregateResult;

/// Progress is logged every this many records
const PROGRESS_INTERVAL: usize = 50;

/// Operator-facing outcome of one aggregation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Candidate sources seen
    pub processed: usize,
    /// Sources normalized into the catalog
    pub succeeded: usize,
    /// Sources that failed collection or parsing
    pub failed: usize,
    /// Records whose id was already taken earlier in the run
    pub duplicates: usize,
    /// Records kept in the index without a per-id file (id unusable as a file name)
    pub skipped_files: usize,
    pub output_dir: PathBuf,
}

impl RunSummary {
    pub fn record_failure(&mut self) {
        self.processed += 1;
        self.failed += 1;
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Success: {}, Errors: {}", self.succeeded, self.failed)?;
        write!(
            f,
            "Processed: {}, Duplicate ids: {}, Skipped files: {}, Output: {}",
            self.processed,
            self.duplicates,
            self.skipped_files,
            self.output_dir.display()
        )
    }
}

/// Accumulates one generation's records
pub struct CatalogBuilder {
    layout: ApiLayout,
    version: String,
    records: Vec<PhenomenonRecord>,
    /// id → source that first claimed it
    claimed: HashMap<String, String>,
    summary: RunSummary,
}

impl CatalogBuilder {
    pub fn new(layout: ApiLayout, version: impl Into<String>) -> Self {
        let summary = RunSummary {
            output_dir: layout.api_dir(),
            ..RunSummary::default()
        };
        Self {
            layout,
            version: version.into(),
            records: Vec::new(),
            claimed: HashMap::new(),
            summary,
        }
    }

    /// Count a source that produced no record
    pub fn record_failure(&mut self) {
        self.summary.record_failure();
    }

    /// Add one normalized record and write its per-id file
    ///
    /// Write failures are fatal: a partial set of per-id files next to a
    /// fresh index would be silently wrong.
    pub fn push(&mut self, source_id: &str, record: PhenomenonRecord) -> AggregateResult<()> {
        if let Some(previous) = self.claimed.get(&record.id) {
            warn!(
                id = %record.id,
                first_source = %previous,
                source_id = %source_id,
                "Duplicate phenomenon id; per-id file will be overwritten"
            );
            self.summary.duplicates += 1;
        } else {
            self.claimed.insert(record.id.clone(), source_id.to_string());
        }

        if is_safe_id(&record.id) {
            write_json_atomic(&self.layout.record_path(&record.id), &record)?;
        } else {
            warn!(id = %record.id, source_id = %source_id, "Id is not a valid file name; skipping per-id file");
            self.summary.skipped_files += 1;
        }

        self.records.push(record);
        self.summary.processed += 1;
        self.summary.succeeded += 1;

        if self.summary.succeeded % PROGRESS_INTERVAL == 0 {
            info!("  {} processed...", self.summary.succeeded);
        }
        Ok(())
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Write `index.json` stamped with `generated` and return the catalog
    pub fn finish(self, generated: DateTime<Utc>) -> AggregateResult<(CatalogArtifact, RunSummary)> {
        let catalog = CatalogArtifact::new(self.version, generated, self.records);
        write_json_atomic(&self.layout.index_path(), &catalog)?;
        info!(total = catalog.total, path = %self.layout.index_path().display(), "Catalog index written");
        Ok((catalog, self.summary))
    }
}
