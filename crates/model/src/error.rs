use std::path::PathBuf;

use thiserror::Error;
use tract_onnx::prelude::TractError;

/// Errors raised while loading a model artifact or running inference.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The artifact file could not be read.
    #[error("failed to read model artifact {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The inference runtime failed to decode, optimize or run the graph.
    #[error(transparent)]
    Runtime(#[from] TractError),

    /// The artifact loaded but does not look like an exported classifier.
    #[error("invalid model artifact: {0}")]
    Invalid(String),

    /// The input row has a different width than the model was fitted on.
    #[error("row has {actual} features, but the model is expecting {expected} features as input")]
    FeatureCountMismatch { expected: usize, actual: usize },

    /// The input row's column names differ from the names seen at fit time.
    #[error("feature names must match those seen at fit time: expected {expected:?}, got {actual:?}")]
    FeatureNamesMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    /// The input row holds NaN or an infinity.
    #[error("input contains a non-finite value for feature {column}")]
    NonFiniteValue { column: String },
}

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
