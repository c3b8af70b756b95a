//! Error types for wyrd-ag
//!
//! Collection errors are counted per source and never abort a run; the
//! variants here are the fatal ones.

use std::path::PathBuf;
use thiserror::Error;

use crate::collector::CollectError;

/// Fatal generation-stage error
#[derive(Debug, Error)]
pub enum AggregateError {
    /// An artifact a stage depends on does not exist (e.g. index.json before `categories`)
    #[error("Required artifact missing: {0}")]
    MissingArtifact(PathBuf),

    /// An artifact exists but does not decode as its expected shape
    #[error("Malformed artifact {path}: {reason}")]
    MalformedArtifact { path: PathBuf, reason: String },

    /// Page template could not be loaded
    #[error("Template error: {0}")]
    Template(String),

    /// Sources could not be enumerated at all
    #[error(transparent)]
    Collect(#[from] CollectError),

    /// wyrd-common error (I/O, JSON, config)
    #[error("Common error: {0}")]
    Common(#[from] wyrd_common::Error),
}

/// Result type for generation stages
pub type AggregateResult<T> = Result<T, AggregateError>;

impl AggregateError {
    /// Map an artifact read failure onto missing / malformed
    pub fn from_artifact_read(path: PathBuf, err: wyrd_common::Error) -> Self {
        match err {
            wyrd_common::Error::NotFound(p) => AggregateError::MissingArtifact(p),
            wyrd_common::Error::Json(e) => AggregateError::MalformedArtifact {
                path,
                reason: e.to_string(),
            },
            other => AggregateError::Common(other),
        }
    }
}
