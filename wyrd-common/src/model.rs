//! Canonical catalog model
//!
//! [`PhenomenonRecord`] is the one shape every source document is normalized
//! into. The artifact types are what the generator writes under `api/v1/`
//! and what the query layer reads back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Artifact format version written into every generated file
pub const ARTIFACT_VERSION: &str = "1.0.0";

/// One normalized catalog entry
///
/// Every field is always present in generated output; absence in the source
/// document is resolved to a default by the normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhenomenonRecord {
    /// Stable identifier, also the per-record file name
    pub id: String,
    pub name: String,
    /// Always lower-case
    pub category: String,
    pub description: String,
    pub aliases: Vec<String>,
    pub tags: Vec<String>,
    pub status: String,
    /// Source order, not deduplicated
    pub regions: Vec<String>,
    pub origin: String,
    /// Year or free-text date marker
    pub first_reported: String,
    pub danger_level: String,
    pub evidence_level: String,
}

/// Combined catalog index (`api/v1/index.json`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogArtifact {
    pub version: String,
    #[serde(with = "iso8601")]
    pub generated: DateTime<Utc>,
    /// Count of included records
    pub total: usize,
    pub phenomena: Vec<PhenomenonRecord>,
}

impl CatalogArtifact {
    /// Build a catalog stamped with `generated`; `total` always equals `phenomena.len()`
    pub fn new(version: impl Into<String>, generated: DateTime<Utc>, phenomena: Vec<PhenomenonRecord>) -> Self {
        Self {
            version: version.into(),
            generated,
            total: phenomena.len(),
            phenomena,
        }
    }

    /// Equality ignoring the generation timestamp
    pub fn same_content(&self, other: &CatalogArtifact) -> bool {
        self.version == other.version && self.total == other.total && self.phenomena == other.phenomena
    }
}

/// Member entry inside a category summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMember {
    pub id: String,
    pub name: String,
    pub regions: Vec<String>,
}

/// Per-category summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub name: String,
    pub count: usize,
    /// Members in catalog order
    pub phenomena: Vec<CategoryMember>,
}

/// Category name → summary
pub type CategoryArtifact = BTreeMap<String, CategorySummary>;

/// Category file (`api/v1/categories.json`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoriesArtifact {
    pub version: String,
    #[serde(with = "iso8601")]
    pub generated: DateTime<Utc>,
    /// Number of distinct categories
    pub total: usize,
    pub categories: CategoryArtifact,
}

/// Histogram file (`api/v1/stats.json`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsArtifact {
    pub version: String,
    #[serde(with = "iso8601")]
    pub generated: DateTime<Utc>,
    pub total_phenomena: usize,
    pub by_category: BTreeMap<String, usize>,
    /// One increment per region per record
    pub by_region: BTreeMap<String, usize>,
    pub by_danger_level: BTreeMap<String, usize>,
    pub by_evidence_level: BTreeMap<String, usize>,
}

/// Serde adapter writing timestamps as `2024-03-09T14:05:00.000Z`
pub mod iso8601 {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&crate::time::to_iso8601(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
