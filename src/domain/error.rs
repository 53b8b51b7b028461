// ============================================================
// Layer 3 - Pipeline Errors
// ============================================================
// One error enum per failing step. The CLI layer wraps these in
// anyhow with extra context and walks the chain to pick an exit
// code, so each step's failure stays distinguishable.

use std::path::PathBuf;
use thiserror::Error;

/// The training dataset could not be read into records.
#[derive(Debug, Error)]
pub enum DatasetLoadError {
    #[error("dataset file '{}' not found", path.display())]
    NotFound { path: PathBuf },

    #[error("cannot read dataset '{}'", path.display())]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("dataset '{}' has no header row", path.display())]
    MissingHeader { path: PathBuf },

    #[error("malformed dataset '{}' at line {line}: {reason}", path.display())]
    Malformed {
        path:   PathBuf,
        line:   u64,
        reason: String,
    },

    #[error("dataset '{}' contains no records", path.display())]
    Empty { path: PathBuf },
}

/// Fitting the classifier failed before any weights were produced.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrainError {
    #[error("training set is empty")]
    EmptyTrainingSet,

    #[error("training record {index} has no label")]
    MissingLabel { index: usize },
}

/// A model artifact could not be turned back into a model.
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("model file '{}' not found; run with --train first", path.display())]
    NotFound { path: PathBuf },

    #[error("cannot read model file '{}'", path.display())]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{}' is not a sentiment model artifact", path.display())]
    BadMagic { path: PathBuf },

    #[error(
        "model file '{}' has format version {found}, expected {expected}",
        path.display()
    )]
    UnsupportedVersion {
        path:     PathBuf,
        found:    u32,
        expected: u32,
    },

    #[error("model file '{}' is truncated", path.display())]
    Truncated { path: PathBuf },

    #[error("model file '{}' is corrupt: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error(
        "model file '{}' declares {declared} features but the model has {actual}",
        path.display()
    )]
    SchemaMismatch {
        path:     PathBuf,
        declared: usize,
        actual:   usize,
    },
}

/// The trained model could not be written to disk.
#[derive(Debug, Error)]
pub enum ModelSaveError {
    #[error("cannot encode model: {reason}")]
    Encode { reason: String },

    #[error("cannot write model file '{}'", path.display())]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },
}
