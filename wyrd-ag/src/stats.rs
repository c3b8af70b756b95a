//! Stats aggregator
//!
//! Histograms over category, region, danger level and evidence level.
//! `by_region` counts once per region per record; the others once per record.

use std::collections::BTreeMap;
use tracing::info;
use wyrd_common::artifact_io::write_json_atomic;
use wyrd_common::{ApiLayout, CatalogArtifact, StatsArtifact};

use crate::error::AggregateResult;

fn bump(histogram: &mut BTreeMap<String, usize>, label: &str) {
    *histogram.entry(label.to_string()).or_insert(0) += 1;
}

/// Compute all histograms for `catalog`
pub fn build_stats(catalog: &CatalogArtifact) -> StatsArtifact {
    let mut stats = StatsArtifact {
        version: catalog.version.clone(),
        generated: catalog.generated,
        total_phenomena: catalog.phenomena.len(),
        by_category: BTreeMap::new(),
        by_region: BTreeMap::new(),
        by_danger_level: BTreeMap::new(),
        by_evidence_level: BTreeMap::new(),
    };

    for record in &catalog.phenomena {
        bump(&mut stats.by_category, &record.category);
        for region in &record.regions {
            bump(&mut stats.by_region, region);
        }
        bump(&mut stats.by_danger_level, &record.danger_level);
        bump(&mut stats.by_evidence_level, &record.evidence_level);
    }

    stats
}

/// Build and write `stats.json`
pub fn write_stats(layout: &ApiLayout, catalog: &CatalogArtifact) -> AggregateResult<StatsArtifact> {
    let stats = build_stats(catalog);
    write_json_atomic(&layout.stats_path(), &stats)?;
    info!(
        total = stats.total_phenomena,
        regions = stats.by_region.len(),
        "✓ Stats generated"
    );
    Ok(stats)
}
