//! Static page rendering
//!
//! Fills `{{PLACEHOLDER}}` markers in a page template with one record's
//! fields and writes `phenomena/{id}/index.html`. Values are HTML-escaped.

use std::borrow::Cow;
use std::path::Path;
use tracing::{info, warn};
use wyrd_common::artifact_io::write_bytes_atomic;
use wyrd_common::layout::is_safe_id;
use wyrd_common::{ApiLayout, CatalogArtifact, PhenomenonRecord};

use crate::error::{AggregateError, AggregateResult};

/// Progress is logged every this many pages
const PROGRESS_INTERVAL: usize = 50;

const BUILTIN_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{{NAME}} - Wyrdness</title>
</head>
<body>
  <article class="phenomenon" data-phenomenon-id="{{ID}}">
    <h1>{{NAME}}</h1>
    <span class="badge badge--{{CATEGORY}}">{{CATEGORY}}</span>
    <p class="phenomenon__description">{{DESCRIPTION}}</p>
    <dl class="phenomenon__facts">
      <dt>Origin</dt><dd>{{ORIGIN}}</dd>
      <dt>Regions</dt><dd>{{REGIONS}}</dd>
      <dt>First reported</dt><dd>{{FIRST_REPORTED}}</dd>
      <dt>Danger level</dt><dd>{{DANGER_LEVEL}}</dd>
      <dt>Evidence level</dt><dd>{{EVIDENCE_LEVEL}}</dd>
    </dl>
    <button data-favorite-id="{{ID}}" aria-pressed="false"><span class="favorite-icon">☆</span></button>
  </article>
</body>
</html>
"#;

/// Escape text for HTML element and attribute content
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Record text for one marker name
fn placeholder_value<'a>(record: &'a PhenomenonRecord, marker: &str) -> Option<Cow<'a, str>> {
    let value = match marker {
        "ID" => Cow::Borrowed(record.id.as_str()),
        "NAME" => Cow::Borrowed(record.name.as_str()),
        "CATEGORY" => Cow::Borrowed(record.category.as_str()),
        "DESCRIPTION" => Cow::Borrowed(record.description.as_str()),
        "ORIGIN" => Cow::Borrowed(record.origin.as_str()),
        "REGIONS" => Cow::Owned(record.regions.join(", ")),
        "FIRST_REPORTED" => Cow::Borrowed(record.first_reported.as_str()),
        "DANGER_LEVEL" => Cow::Borrowed(record.danger_level.as_str()),
        "EVIDENCE_LEVEL" => Cow::Borrowed(record.evidence_level.as_str()),
        _ => return None,
    };
    Some(value)
}

/// Template-backed page renderer
#[derive(Debug, Clone)]
pub struct PageRenderer {
    template: String,
}

impl PageRenderer {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn builtin() -> Self {
        Self::new(BUILTIN_TEMPLATE)
    }

    pub fn from_path(path: &Path) -> AggregateResult<Self> {
        std::fs::read_to_string(path)
            .map(Self::new)
            .map_err(|e| AggregateError::Template(format!("{}: {}", path.display(), e)))
    }

    /// Fill every known `{{MARKER}}` in one pass over the template
    ///
    /// Substituted values are never rescanned, so marker text inside a
    /// record is emitted literally. Unknown markers are left as they are.
    pub fn render(&self, record: &PhenomenonRecord) -> String {
        let mut html = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();

        while let Some(open) = rest.find("{{") {
            html.push_str(&rest[..open]);
            let after = &rest[open + 2..];
            let filled = after
                .find("}}")
                .and_then(|close| placeholder_value(record, &after[..close]).map(|value| (close, value)));

            match filled {
                Some((close, value)) => {
                    html.push_str(&escape_html(&value));
                    rest = &after[close + 2..];
                }
                None => {
                    html.push_str("{{");
                    rest = after;
                }
            }
        }

        html.push_str(rest);
        html
    }

    /// Render every record of `catalog`; returns the number of pages written
    pub fn write_pages(&self, layout: &ApiLayout, catalog: &CatalogArtifact) -> AggregateResult<usize> {
        let mut count = 0;

        for record in &catalog.phenomena {
            if !is_safe_id(&record.id) {
                warn!(id = %record.id, "Id is not a valid directory name; skipping page");
                continue;
            }
            let html = self.render(record);
            write_bytes_atomic(&layout.page_path(&record.id), html.as_bytes())?;

            count += 1;
            if count % PROGRESS_INTERVAL == 0 {
                info!("  {} pages generated...", count);
            }
        }

        info!("✓ Generated {} phenomenon pages", count);
        Ok(count)
    }
}

impl Default for PageRenderer {
    fn default() -> Self {
        Self::builtin()
    }
}
