// Detector Errors

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("Model not loaded!")]
    NotTrained,
    #[error("{0} is not fitted yet")]
    NotFitted(&'static str),
    #[error("Cannot fit on an empty corpus")]
    EmptyCorpus,
    #[error("After pruning, no terms remain. Try a lower min_df or a higher max_df")]
    EmptyVocabulary,
    #[error("Feature dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("Number of samples ({samples}) does not match number of labels ({labels})")]
    LengthMismatch { samples: usize, labels: usize },
    #[error("Training data has no examples for class {0}")]
    SingleClass(&'static str),
    #[error("test_size must be between 0 and 1, got {0}")]
    InvalidTestSize(f64),
    #[error("Split leaves no examples in the {0} set")]
    EmptySplit(&'static str),

    #[error("Training data is empty: {0}")]
    EmptyDataset(PathBuf),
    #[error("Training data is missing required column '{0}'")]
    MissingColumn(&'static str),
    #[error("Invalid label '{value}' on row {row} (expected 0 or 1)")]
    InvalidLabel { row: usize, value: String },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Model artifact not found: {0}")]
    MissingArtifact(PathBuf),
    #[error("Model artifact {path} is corrupt: {reason}")]
    CorruptArtifact { path: PathBuf, reason: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DetectorError>;
