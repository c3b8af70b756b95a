//! Category aggregator
//!
//! Groups catalog records by (already lower-cased) category. Members keep
//! catalog order; categories are key-sorted in the output.

use tracing::info;
use wyrd_common::artifact_io::write_json_atomic;
use wyrd_common::{ApiLayout, CatalogArtifact, CategoriesArtifact, CategoryArtifact, CategoryMember, CategorySummary};

use crate::error::AggregateResult;

/// Group records by category
pub fn group_by_category(catalog: &CatalogArtifact) -> CategoryArtifact {
    let mut categories = CategoryArtifact::new();

    for record in &catalog.phenomena {
        let summary = categories
            .entry(record.category.clone())
            .or_insert_with(|| CategorySummary {
                name: record.category.clone(),
                count: 0,
                phenomena: Vec::new(),
            });

        summary.count += 1;
        summary.phenomena.push(CategoryMember {
            id: record.id.clone(),
            name: record.name.clone(),
            regions: record.regions.clone(),
        });
    }

    categories
}

/// Category file derived from `catalog`, carrying the catalog's version and timestamp
pub fn build_categories(catalog: &CatalogArtifact) -> CategoriesArtifact {
    let categories = group_by_category(catalog);
    CategoriesArtifact {
        version: catalog.version.clone(),
        generated: catalog.generated,
        total: categories.len(),
        categories,
    }
}

/// Build and write `categories.json`
pub fn write_categories(layout: &ApiLayout, catalog: &CatalogArtifact) -> AggregateResult<CategoriesArtifact> {
    let artifact = build_categories(catalog);
    write_json_atomic(&layout.categories_path(), &artifact)?;
    info!("✓ Generated {} categories", artifact.total);
    Ok(artifact)
}
