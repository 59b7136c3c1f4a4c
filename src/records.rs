use polars::prelude::{DataType, Field, Schema};

use crate::error::HeartRiskError;

/// The 13 raw clinical attributes, in dataset column order. Form input,
/// `--record` input and the training CSV must all follow this order.
pub const RAW_COLUMNS: [&str; 13] = [
    "age", "sex", "cp", "trestbps", "chol", "fbs", "restecg", "thalach", "exang", "oldpeak",
    "slope", "ca", "thal",
];

/// Columns that go through one-hot expansion, in encoder fit order.
/// This order is shared by the training and serving paths; the persisted
/// feature-column list is derived from it and validated at load time.
pub const CATEGORICAL_COLUMNS: [&str; 5] = ["cp", "restecg", "slope", "thal", "ca"];

/// Columns fed to the classifier as-is, original relative order preserved.
pub const NUMERICAL_COLUMNS: [&str; 8] = [
    "age", "sex", "trestbps", "chol", "fbs", "thalach", "exang", "oldpeak",
];

pub const TARGET_COLUMN: &str = "target";

/// One patient, split the way the model consumes it: the five coded
/// attributes are kept as integers, everything else as floats.
#[derive(Debug, Clone, PartialEq)]
pub struct PatientRecord {
    pub age: f64,
    pub sex: f64,
    pub cp: i64,
    pub trestbps: f64,
    pub chol: f64,
    pub fbs: f64,
    pub restecg: i64,
    pub thalach: f64,
    pub exang: f64,
    pub oldpeak: f64,
    pub slope: i64,
    pub ca: i64,
    pub thal: i64,
}

impl PatientRecord {
    /// Builds a record from 13 raw values in `RAW_COLUMNS` order.
    ///
    /// Rejects anything that is not exactly 13 values before it can reach
    /// the classifier, and rejects non-integral values in the coded
    /// categorical positions.
    pub fn from_slice(values: &[f64]) -> Result<Self, HeartRiskError> {
        if values.len() != RAW_COLUMNS.len() {
            return Err(HeartRiskError::SchemaMismatch {
                expected: RAW_COLUMNS.len(),
                actual: values.len(),
            });
        }
        Ok(PatientRecord {
            age: values[0],
            sex: values[1],
            cp: categorical_code(values, 2)?,
            trestbps: values[3],
            chol: values[4],
            fbs: values[5],
            restecg: categorical_code(values, 6)?,
            thalach: values[7],
            exang: values[8],
            oldpeak: values[9],
            slope: categorical_code(values, 10)?,
            ca: categorical_code(values, 11)?,
            thal: categorical_code(values, 12)?,
        })
    }

    /// Numerical subset, `NUMERICAL_COLUMNS` order.
    pub fn numerical_values(&self) -> [f64; 8] {
        [
            self.age,
            self.sex,
            self.trestbps,
            self.chol,
            self.fbs,
            self.thalach,
            self.exang,
            self.oldpeak,
        ]
    }

    /// Categorical subset, `CATEGORICAL_COLUMNS` order.
    pub fn categorical_values(&self) -> [i64; 5] {
        [self.cp, self.restecg, self.slope, self.thal, self.ca]
    }

    /// The record back as 13 raw values in `RAW_COLUMNS` order.
    pub fn to_raw(&self) -> [f64; 13] {
        [
            self.age,
            self.sex,
            self.cp as f64,
            self.trestbps,
            self.chol,
            self.fbs,
            self.restecg as f64,
            self.thalach,
            self.exang,
            self.oldpeak,
            self.slope as f64,
            self.ca as f64,
            self.thal as f64,
        ]
    }

    /// Dataset schema for the training CSV: 13 feature columns plus the
    /// binary target.
    pub fn raw_schema() -> Schema {
        let mut fields: Vec<Field> = RAW_COLUMNS
            .iter()
            .map(|name| Field::new(name, DataType::Float64))
            .collect();
        fields.push(Field::new(TARGET_COLUMN, DataType::Int64));
        Schema::from_iter(fields)
    }
}

fn categorical_code(values: &[f64], index: usize) -> Result<i64, HeartRiskError> {
    let value = values[index];
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(HeartRiskError::InvalidValue {
            column: RAW_COLUMNS[index].to_string(),
            value,
        });
    }
    Ok(value as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE_RAW: [f64; 13] = [
        63.0, 1.0, 3.0, 145.0, 233.0, 1.0, 0.0, 150.0, 0.0, 2.3, 0.0, 0.0, 1.0,
    ];

    #[test]
    fn raw_schema_has_all_columns() {
        let schema = PatientRecord::raw_schema();
        assert_eq!(schema.len(), 14);
        for name in RAW_COLUMNS {
            assert!(schema.get(name).is_some(), "missing {name}");
        }
        assert_eq!(schema.get(TARGET_COLUMN), Some(&DataType::Int64));
    }

    #[test]
    fn from_slice_splits_record() {
        let record = PatientRecord::from_slice(&EXAMPLE_RAW).unwrap();
        assert_eq!(record.age, 63.0);
        assert_eq!(record.oldpeak, 2.3);
        assert_eq!(record.categorical_values(), [3, 0, 0, 1, 0]);
        assert_eq!(
            record.numerical_values(),
            [63.0, 1.0, 145.0, 233.0, 1.0, 150.0, 0.0, 2.3]
        );
        assert_eq!(record.to_raw(), EXAMPLE_RAW);
    }

    #[test]
    fn short_record_is_rejected() {
        let err = PatientRecord::from_slice(&EXAMPLE_RAW[..12]).unwrap_err();
        assert!(matches!(
            err,
            HeartRiskError::SchemaMismatch {
                expected: 13,
                actual: 12
            }
        ));
    }

    #[test]
    fn long_record_is_rejected() {
        let mut values = EXAMPLE_RAW.to_vec();
        values.push(0.0);
        let err = PatientRecord::from_slice(&values).unwrap_err();
        assert!(matches!(
            err,
            HeartRiskError::SchemaMismatch {
                expected: 13,
                actual: 14
            }
        ));
    }

    #[test]
    fn fractional_categorical_is_rejected() {
        let mut values = EXAMPLE_RAW;
        values[12] = 1.5; // thal
        let err = PatientRecord::from_slice(&values).unwrap_err();
        assert!(matches!(err, HeartRiskError::InvalidValue { column, .. } if column == "thal"));
    }
}
