//! Search predicates over catalog records

use serde::{Deserialize, Serialize};
use wyrd_common::PhenomenonRecord;

/// Exact-match filters, AND-combined with the text query
///
/// An absent or empty filter value matches every record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl SearchFilters {
    pub fn category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            ..Self::default()
        }
    }

    pub fn region(region: impl Into<String>) -> Self {
        Self {
            region: Some(region.into()),
            ..Self::default()
        }
    }

    pub fn status(status: impl Into<String>) -> Self {
        Self {
            status: Some(status.into()),
            ..Self::default()
        }
    }

    /// Whether `record` satisfies the text query and every set filter
    pub fn matches(&self, record: &PhenomenonRecord, query: &str) -> bool {
        matches_query(record, query)
            && exact(&self.category, |c| record.category == c)
            && exact(&self.region, |r| record.regions.iter().any(|region| region == r))
            && exact(&self.status, |s| record.status == s)
    }
}

fn exact(filter: &Option<String>, predicate: impl Fn(&str) -> bool) -> bool {
    match filter.as_deref() {
        None | Some("") => true,
        Some(value) => predicate(value),
    }
}

/// Case-insensitive substring match on name, aliases, category or regions
pub fn matches_query(record: &PhenomenonRecord, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    let contains = |text: &str| text.to_lowercase().contains(&needle);

    contains(&record.name)
        || record.aliases.iter().any(|alias| contains(alias))
        || contains(&record.category)
        || record.regions.iter().any(|region| contains(region))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, category: &str, regions: &[&str]) -> PhenomenonRecord {
        PhenomenonRecord {
            id: name.to_lowercase().replace(' ', "-"),
            name: name.to_string(),
            category: category.to_string(),
            description: String::new(),
            aliases: vec![],
            tags: vec![],
            status: "unknown".to_string(),
            regions: regions.iter().map(|r| r.to_string()).collect(),
            origin: String::new(),
            first_reported: "Unknown".to_string(),
            danger_level: "unknown".to_string(),
            evidence_level: "unknown".to_string(),
        }
    }

    #[test]
    fn test_text_matches_any_field() {
        let mut nessie = record("Loch Ness Monster", "cryptid", &["Scotland"]);
        nessie.aliases = vec!["Nessie".to_string()];

        assert!(matches_query(&nessie, "LOCH"));
        assert!(matches_query(&nessie, "nessie"));
        assert!(matches_query(&nessie, "crypt"));
        assert!(matches_query(&nessie, "scot"));
        assert!(!matches_query(&nessie, "yeti"));
        assert!(matches_query(&nessie, ""));
    }

    #[test]
    fn test_filters_are_and_combined() {
        let mut bigfoot = record("Bigfoot", "cryptid", &["USA", "Canada"]);
        bigfoot.status = "active".to_string();

        assert!(SearchFilters::region("Canada").matches(&bigfoot, ""));
        assert!(!SearchFilters::region("Can").matches(&bigfoot, ""));

        let filters = SearchFilters {
            category: Some("cryptid".to_string()),
            region: Some("USA".to_string()),
            status: Some("dormant".to_string()),
        };
        assert!(!filters.matches(&bigfoot, ""));

        let filters = SearchFilters {
            status: Some("active".to_string()),
            ..filters
        };
        assert!(filters.matches(&bigfoot, "big"));
        assert!(!filters.matches(&bigfoot, "loch"));
    }

    #[test]
    fn test_empty_filter_value_matches_all() {
        let record = record("Bigfoot", "cryptid", &[]);
        assert!(SearchFilters::category("").matches(&record, ""));
        assert!(!SearchFilters::category("Cryptid").matches(&record, ""));
    }
}
