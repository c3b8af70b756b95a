//! Raw document normalization
//!
//! Source documents went through several schema generations (nested
//! `phenomenon`/`distribution` blocks, flat legacy fields, mixtures of both).
//! Each canonical field is resolved through a precedence chain: an ordered
//! list of JSON paths, most specific first. The first path holding a usable
//! value wins; otherwise the field takes its entry from [`DEFAULTS`].
//!
//! A value is usable when it has the field's JSON type:
//! - text fields: a non-empty string (`first_reported` also accepts a number)
//! - list fields: an array (possibly empty); non-string elements are dropped
//!
//! [`normalize`] is total: every input, including non-objects, produces a
//! fully populated record.

use serde_json::Value;
use wyrd_common::PhenomenonRecord;

use crate::collector::RawDocument;

/// Fallback values for every canonical field
#[derive(Debug, Clone, Copy)]
pub struct FieldDefaults {
    pub category: &'static str,
    pub description: &'static str,
    pub status: &'static str,
    pub origin: &'static str,
    pub first_reported: &'static str,
    pub danger_level: &'static str,
    pub evidence_level: &'static str,
}

/// The one default table consulted by [`normalize`]
///
/// `id` falls back to the source tag and `name` to the resolved id; list
/// fields fall back to empty.
pub const DEFAULTS: FieldDefaults = FieldDefaults {
    category: "uncategorized",
    description: "",
    status: "unknown",
    origin: "",
    first_reported: "Unknown",
    danger_level: "unknown",
    evidence_level: "unknown",
};

/// JSON path: object keys from the document root
type Path = &'static [&'static str];

/// Ordered lookup attempts for one field
type Chain = &'static [Path];

const ID: Chain = &[&["phenomenon", "id"], &["id"]];
const NAME: Chain = &[&["phenomenon", "name"], &["name"]];
const CATEGORY: Chain = &[&["phenomenon", "category"], &["category"]];
const DESCRIPTION: Chain = &[
    &["phenomenon", "description", "summary"],
    &["phenomenon", "description"],
    &["description"],
];
const ALIASES: Chain = &[&["phenomenon", "aliases"], &["aliases"]];
const TAGS: Chain = &[&["phenomenon", "tags"], &["tags"]];
const STATUS: Chain = &[&["phenomenon", "status"], &["status"]];
const REGIONS: Chain = &[
    &["distribution", "range", "regions"],
    &["distribution", "range", "countries"],
    &["regions"],
];
const ORIGIN: Chain = &[&["distribution", "range", "description"], &["origin"]];
const FIRST_REPORTED: Chain = &[
    &["distribution", "temporal", "first_recorded", "date"],
    &["first_reported"],
];
const DANGER_LEVEL: Chain = &[&["phenomenon", "danger_level"], &["danger_level"]];
const EVIDENCE_LEVEL: Chain = &[&["phenomenon", "evidence_level"], &["evidence_level"]];

fn lookup<'a>(raw: &'a Value, path: Path) -> Option<&'a Value> {
    path.iter().try_fold(raw, |node, key| node.as_object()?.get(*key))
}

fn as_text(value: &Value) -> Option<String> {
    value.as_str().filter(|s| !s.is_empty()).map(str::to_string)
}

/// Strings as-is, numbers rendered (`1933` → `"1933"`)
fn as_text_or_number(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        other => as_text(other),
    }
}

fn as_string_list(value: &Value) -> Option<Vec<String>> {
    value.as_array().map(|items| {
        items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect()
    })
}

/// First usable value along `chain`
fn resolve<T>(raw: &Value, chain: Chain, accept: impl Fn(&Value) -> Option<T>) -> Option<T> {
    chain
        .iter()
        .filter_map(|path| lookup(raw, *path))
        .find_map(accept)
}

fn text_or(raw: &Value, chain: Chain, default: &str) -> String {
    resolve(raw, chain, as_text).unwrap_or_else(|| default.to_string())
}

fn list_or_empty(raw: &Value, chain: Chain) -> Vec<String> {
    resolve(raw, chain, as_string_list).unwrap_or_default()
}

/// Map one raw document to the canonical record
///
/// `source_id` is the collector's tag for the document, used when the
/// document declares no id of its own.
pub fn normalize(raw: &RawDocument, source_id: &str) -> PhenomenonRecord {
    let id = resolve(raw, ID, as_text).unwrap_or_else(|| source_id.to_string());
    let name = resolve(raw, NAME, as_text).unwrap_or_else(|| id.clone());

    PhenomenonRecord {
        name,
        category: text_or(raw, CATEGORY, DEFAULTS.category).to_lowercase(),
        description: text_or(raw, DESCRIPTION, DEFAULTS.description),
        aliases: list_or_empty(raw, ALIASES),
        tags: list_or_empty(raw, TAGS),
        status: text_or(raw, STATUS, DEFAULTS.status),
        regions: list_or_empty(raw, REGIONS),
        origin: text_or(raw, ORIGIN, DEFAULTS.origin),
        first_reported: resolve(raw, FIRST_REPORTED, as_text_or_number)
            .unwrap_or_else(|| DEFAULTS.first_reported.to_string()),
        danger_level: text_or(raw, DANGER_LEVEL, DEFAULTS.danger_level),
        evidence_level: text_or(raw, EVIDENCE_LEVEL, DEFAULTS.evidence_level),
        id,
    }
}
