//! # Wyrdness Common Library
//!
//! Shared code for the catalog generator and the query layer:
//! - Canonical phenomenon record and generated artifact shapes
//! - Generated file layout and endpoint names
//! - Atomic JSON artifact reading/writing
//! - TOML bootstrap configuration and layered resolution
//! - Tracing initialisation and timestamp helpers

pub mod artifact_io;
pub mod config;
pub mod error;
pub mod layout;
pub mod logging;
pub mod model;
pub mod time;

pub use error::{Error, Result};
pub use layout::ApiLayout;
pub use model::{
    CatalogArtifact, CategoriesArtifact, CategoryArtifact, CategoryMember, CategorySummary,
    PhenomenonRecord, StatsArtifact,
};
