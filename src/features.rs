use crate::encoder::OneHotEncoder;
use crate::error::HeartRiskError;
use crate::records::{PatientRecord, NUMERICAL_COLUMNS};

/// Derives the classifier's column order from a fitted encoder:
/// numerical columns first (original relative order), then the encoder's
/// indicator columns. The list persisted at train time is produced by this
/// function and re-checked against it when artifacts are loaded.
pub fn feature_columns(encoder: &OneHotEncoder) -> Vec<String> {
    NUMERICAL_COLUMNS
        .iter()
        .map(|name| name.to_string())
        .chain(encoder.feature_names())
        .collect()
}

/// Turns one raw patient record into the exact feature vector the
/// classifier expects: `[numerical values] ++ [one-hot values]`.
///
/// Pure function of `(record, encoder)`; both the training and the serving
/// path go through here, so the positional contract cannot drift between
/// the two phases.
pub fn encode_record(
    record: &PatientRecord,
    encoder: &OneHotEncoder,
) -> Result<Vec<f64>, HeartRiskError> {
    let mut features = Vec::with_capacity(NUMERICAL_COLUMNS.len() + encoder.output_width());
    features.extend_from_slice(&record.numerical_values());
    features.extend(encoder.transform(&record.categorical_values())?);
    Ok(features)
}
