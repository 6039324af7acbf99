use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelStoreError {
    #[error("Failed to load classifier artifact '{path}': {reason}")]
    Load { path: PathBuf, reason: String },
    #[error("Failed to save classifier artifact '{path}': {reason}")]
    Save { path: PathBuf, reason: String },
    #[error("Invalid classifier parameters: {0}")]
    InvalidParameters(String),
    #[error("Classifier expects {found} features, requests carry {expected}")]
    FeatureMismatch { expected: usize, found: usize },
    #[error("Class index {index} has no label (model knows {known} class names)")]
    UnknownClass { index: usize, known: usize },
    #[error("Inference failed: {0}")]
    Inference(String),
    #[error("Model host is not running")]
    HostUnavailable,
}

/// Errors raised while turning request input into features.
#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("Missing required parameter '{0}'")]
    MissingParameter(String),
    #[error("Parameter '{name}' is not a finite number: '{value}'")]
    InvalidParameter { name: String, value: String },
    #[error("Record {row} has {found} columns, expected {expected}")]
    ColumnCount {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("Record {row}, column {column} is not a finite number: '{value}'")]
    NonNumericCell {
        row: usize,
        column: usize,
        value: String,
    },
    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),
}
