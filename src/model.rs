use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use log::debug;
use smartcore::linalg::basic::arrays::Array;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::logistic_regression::LogisticRegression;

use crate::encoder::OneHotEncoder;
use crate::error::HeartRiskError;
use crate::features::{encode_record, feature_columns};
use crate::records::PatientRecord;

pub const MODEL_FILE: &str = "model.bin";
pub const ENCODER_FILE: &str = "encoder.bin";
pub const COLUMNS_FILE: &str = "feature_columns.json";

/// Decision threshold on the positive-class probability. The boundary value
/// itself maps to a positive diagnosis.
pub const DECISION_THRESHOLD: f64 = 0.5;

pub type Classifier = LogisticRegression<f64, i32, DenseMatrix<f64>, Vec<i32>>;

/// The three persisted artifacts, loaded once per process and read-only
/// afterwards. Constructed at startup and passed explicitly to inference
/// instead of living in global state.
#[derive(Debug)]
pub struct HeartModel {
    model: Classifier,
    encoder: OneHotEncoder,
    feature_columns: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagnosis {
    Positive,
    Negative,
}

impl Diagnosis {
    pub fn from_probability(probability: f64) -> Self {
        if probability >= DECISION_THRESHOLD {
            Diagnosis::Positive
        } else {
            Diagnosis::Negative
        }
    }
}

impl fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnosis::Positive => write!(f, "Positive for Heart Disease"),
            Diagnosis::Negative => write!(f, "No Heart Disease Detected"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub diagnosis: Diagnosis,
    pub probability: f64,
}

impl HeartModel {
    pub fn new(
        model: Classifier,
        encoder: OneHotEncoder,
        feature_columns: Vec<String>,
    ) -> Result<Self, HeartRiskError> {
        let artifacts = HeartModel {
            model,
            encoder,
            feature_columns,
        };
        artifacts.validate_columns()?;
        Ok(artifacts)
    }

    pub fn feature_columns(&self) -> &[String] {
        &self.feature_columns
    }

    /// Writes the three artifact files into `dir`.
    pub fn save(&self, dir: &Path) -> Result<(), HeartRiskError> {
        fs::create_dir_all(dir)?;
        fs::write(dir.join(MODEL_FILE), bincode::serialize(&self.model)?)?;
        fs::write(dir.join(ENCODER_FILE), bincode::serialize(&self.encoder)?)?;
        fs::write(
            dir.join(COLUMNS_FILE),
            serde_json::to_vec_pretty(&self.feature_columns)?,
        )?;
        debug!("saved artifacts to {}", dir.display());
        Ok(())
    }

    /// Loads the three artifact files from `dir`. A missing file is fatal;
    /// so is a persisted column list that does not match what the loaded
    /// encoder would produce.
    pub fn load(dir: &Path) -> Result<Self, HeartRiskError> {
        let model = bincode::deserialize(&read_artifact(&dir.join(MODEL_FILE))?)?;
        let encoder = bincode::deserialize(&read_artifact(&dir.join(ENCODER_FILE))?)?;
        let feature_columns = serde_json::from_slice(&read_artifact(&dir.join(COLUMNS_FILE))?)?;
        debug!("loaded artifacts from {}", dir.display());
        HeartModel::new(model, encoder, feature_columns)
    }

    /// Encodes one record and asks the classifier for its positive-class
    /// probability. Deterministic for fixed artifacts and input.
    pub fn predict(&self, record: &PatientRecord) -> Result<Prediction, HeartRiskError> {
        let features = encode_record(record, &self.encoder)?;
        if features.len() != self.feature_columns.len() {
            return Err(HeartRiskError::SchemaMismatch {
                expected: self.feature_columns.len(),
                actual: features.len(),
            });
        }
        let probability = self.probability(&features)?;
        Ok(Prediction {
            diagnosis: Diagnosis::from_probability(probability),
            probability,
        })
    }

    /// Positive-class probability of one encoded row: the logistic model's
    /// sigmoid over its fitted coefficients.
    fn probability(&self, features: &[f64]) -> Result<f64, HeartRiskError> {
        let coefficients = self.model.coefficients();
        let (rows, cols) = coefficients.shape();
        // Binary models carry a single coefficient vector; accept either
        // orientation of the underlying matrix.
        let weights: Vec<f64> = if rows == 1 {
            (0..cols).map(|j| *coefficients.get((0, j))).collect()
        } else {
            (0..rows).map(|i| *coefficients.get((i, 0))).collect()
        };
        if weights.len() != features.len() {
            return Err(HeartRiskError::SchemaMismatch {
                expected: weights.len(),
                actual: features.len(),
            });
        }
        let bias = *self.model.intercept().get((0, 0));
        let z: f64 = bias
            + weights
                .iter()
                .zip(features)
                .map(|(weight, value)| weight * value)
                .sum::<f64>();
        Ok(1.0 / (1.0 + (-z).exp()))
    }

    fn validate_columns(&self) -> Result<(), HeartRiskError> {
        let derived = feature_columns(&self.encoder);
        if derived != self.feature_columns {
            return Err(HeartRiskError::ColumnOrderDrift {
                expected: self.feature_columns.clone(),
                actual: derived,
            });
        }
        Ok(())
    }
}

fn read_artifact(path: &Path) -> Result<Vec<u8>, HeartRiskError> {
    match fs::read(path) {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(HeartRiskError::ArtifactMissing {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(e.into()),
    }
}
