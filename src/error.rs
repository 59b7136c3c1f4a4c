use std::num::ParseFloatError;
use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

/// Crate-wide error type. Every failure is fatal for the request that hit
/// it; there is no retry or partial-result path anywhere in the app.
#[derive(Error, Debug)]
pub enum HeartRiskError {
    #[error("unknown category {value} for column {column:?}; the encoder was never fitted on it")]
    UnknownCategory { column: String, value: i64 },

    #[error("schema mismatch: expected {expected} values, got {actual}")]
    SchemaMismatch { expected: usize, actual: usize },

    #[error("invalid value {value} for column {column:?}")]
    InvalidValue { column: String, value: f64 },

    #[error("dataset is missing required column {name:?}")]
    MissingColumn { name: String },

    #[error("null value in column {column:?} at row {row}")]
    MissingValue { column: String, row: usize },

    #[error("dataset contains no rows")]
    EmptyDataset,

    #[error("artifact file not found: {path:?}; run `heart-risk train` first")]
    ArtifactMissing { path: PathBuf },

    #[error("feature column order drift: artifact lists {expected:?} but encoder produces {actual:?}")]
    ColumnOrderDrift {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("form input aborted")]
    FormAborted,

    #[error("invalid number: {message}")]
    NumberFormat { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Dataframe(#[from] PolarsError),

    #[error(transparent)]
    Model(#[from] smartcore::error::Failed),

    #[error(transparent)]
    Artifact(#[from] bincode::Error),

    #[error(transparent)]
    Columns(#[from] serde_json::Error),
}

impl From<ParseFloatError> for HeartRiskError {
    fn from(e: ParseFloatError) -> Self {
        HeartRiskError::NumberFormat {
            message: e.to_string(),
        }
    }
}
