//! Chronological projection of the catalog

use serde::{Deserialize, Serialize};
use wyrd_common::CatalogArtifact;

const UNKNOWN_REGION: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub id: String,
    pub name: String,
    pub year: i32,
    pub category: String,
    /// First listed region, or `Unknown`
    pub region: String,
}

/// Leading integer of a date marker: `"1933"`, `"1966-11-15"`, `"-500 BCE"`
///
/// Leading whitespace and one sign are allowed; anything without leading
/// digits has no year.
pub fn parse_year(marker: &str) -> Option<i32> {
    let trimmed = marker.trim_start();
    let (sign, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };
    let digits: &str = &rest[..rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len())];
    if digits.is_empty() {
        return None;
    }
    digits.parse::<i32>().ok().map(|year| sign * year)
}

/// Dated records, oldest first; records with equal years keep catalog order
pub fn timeline(catalog: &CatalogArtifact) -> Vec<TimelineEntry> {
    let mut entries: Vec<TimelineEntry> = catalog
        .phenomena
        .iter()
        .filter_map(|record| {
            let year = parse_year(&record.first_reported)?;
            Some(TimelineEntry {
                id: record.id.clone(),
                name: record.name.clone(),
                year,
                category: record.category.clone(),
                region: record
                    .regions
                    .first()
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN_REGION.to_string()),
            })
        })
        .collect();

    entries.sort_by_key(|entry| entry.year);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use wyrd_common::PhenomenonRecord;

    fn record(id: &str, first_reported: &str, regions: &[&str]) -> PhenomenonRecord {
        PhenomenonRecord {
            id: id.to_string(),
            name: id.to_string(),
            category: "cryptid".to_string(),
            description: String::new(),
            aliases: vec![],
            tags: vec![],
            status: "unknown".to_string(),
            regions: regions.iter().map(|r| r.to_string()).collect(),
            origin: String::new(),
            first_reported: first_reported.to_string(),
            danger_level: "unknown".to_string(),
            evidence_level: "unknown".to_string(),
        }
    }

    #[test]
    fn test_parse_year() {
        assert_eq!(parse_year("1933"), Some(1933));
        assert_eq!(parse_year("1966-11-15"), Some(1966));
        assert_eq!(parse_year(" -500 BCE"), Some(-500));
        assert_eq!(parse_year("Unknown"), None);
        assert_eq!(parse_year(""), None);
        assert_eq!(parse_year("-"), None);
    }

    #[test]
    fn test_timeline_orders_and_skips_undated() {
        let catalog = CatalogArtifact::new(
            "1.0.0",
            Utc::now(),
            vec![
                record("mothman", "1966-11-15", &["USA"]),
                record("yeti", "Unknown", &["Nepal"]),
                record("nessie", "1933", &["Scotland", "UK"]),
                record("chupacabra", "1995", &[]),
                record("flatwoods", "1966", &[]),
            ],
        );

        let entries = timeline(&catalog);
        let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["nessie", "mothman", "flatwoods", "chupacabra"]);
        assert_eq!(entries[0].region, "Scotland");
        assert_eq!(entries[3].region, "Unknown");
    }
}
