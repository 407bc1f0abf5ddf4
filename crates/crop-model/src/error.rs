//! Errors raised while loading a classifier artifact.
//!
//! [`ClassifierUnavailable`] covers the conditions the service runs through
//! in fallback mode. [`ModelLoadError`] is a deployment defect and stops
//! start-up.

use thiserror::Error;

/// Expected, recoverable reasons for running without a classifier
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassifierUnavailable {
    #[error("classifier artifact not found at {path}")]
    Missing { path: String },

    #[error("classifier kind '{kind}' cannot produce class probabilities")]
    NoProbabilityScoring { kind: String },
}

/// Fatal artifact problems
#[derive(Error, Debug)]
pub enum ModelLoadError {
    #[error("Failed to read classifier artifact {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed classifier artifact: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The artifact was trained on different columns than the pipeline builds
    #[error("Feature schema mismatch: artifact expects {found:?}, pipeline produces {expected:?}")]
    FeatureSchema {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Invalid classifier artifact: {0}")]
    Invalid(String),
}
