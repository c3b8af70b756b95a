//! wyrd-ag - catalog aggregation and site generation
//!
//! Collects raw phenomenon documents from many independently authored
//! sources, normalizes them into one canonical record shape, and writes the
//! generated artifacts:
//!
//! ```text
//! SourceCollector → normalize → CatalogBuilder → { categories, stats, pages }
//! ```
//!
//! Collection failures are per-source and never abort a run. Aggregation
//! failures (missing or malformed catalog) abort the affected stage.

pub mod catalog;
pub mod categories;
pub mod collector;
pub mod config;
pub mod error;
pub mod normalizer;
pub mod pages;
pub mod pipeline;
pub mod serve;
pub mod stats;

pub use crate::catalog::{CatalogBuilder, RunSummary};
pub use crate::collector::{CollectError, SourceCollector, SourceItem};
pub use crate::error::{AggregateError, AggregateResult};
pub use crate::normalizer::normalize;
pub use crate::pipeline::Pipeline;
