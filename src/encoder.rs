use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::HeartRiskError;

/// One-hot encoder over integer-coded categorical columns, with the first
/// (lowest) category of each column dropped to avoid collinearity.
///
/// The category tables are fixed at fit time; a value that was never seen
/// during fitting is rejected instead of being zero-filled, so a bad input
/// can never masquerade as the dropped baseline category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    columns: Vec<String>,
    /// Per column: observed category codes, ascending. Index 0 is the
    /// dropped baseline and emits no indicator column.
    categories: Vec<Vec<i64>>,
}

impl OneHotEncoder {
    /// Fits the encoder on full training columns. `values[i]` holds every
    /// training value of `columns[i]`.
    pub fn fit(columns: &[&str], values: &[Vec<i64>]) -> Result<Self, HeartRiskError> {
        if columns.len() != values.len() {
            return Err(HeartRiskError::SchemaMismatch {
                expected: columns.len(),
                actual: values.len(),
            });
        }
        let mut categories = Vec::with_capacity(columns.len());
        for column_values in values {
            if column_values.is_empty() {
                return Err(HeartRiskError::EmptyDataset);
            }
            let unique: BTreeSet<i64> = column_values.iter().copied().collect();
            categories.push(unique.into_iter().collect());
        }
        Ok(OneHotEncoder {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            categories,
        })
    }

    /// Expands one record of categorical values (same column order as at
    /// fit time) into its indicator vector.
    pub fn transform(&self, record: &[i64]) -> Result<Vec<f64>, HeartRiskError> {
        if record.len() != self.columns.len() {
            return Err(HeartRiskError::SchemaMismatch {
                expected: self.columns.len(),
                actual: record.len(),
            });
        }
        let mut encoded = Vec::with_capacity(self.output_width());
        for ((column, categories), value) in self.columns.iter().zip(&self.categories).zip(record)
        {
            let position = categories.binary_search(value).map_err(|_| {
                HeartRiskError::UnknownCategory {
                    column: column.clone(),
                    value: *value,
                }
            })?;
            let offset = encoded.len();
            encoded.resize(offset + categories.len() - 1, 0.0);
            if position > 0 {
                encoded[offset + position - 1] = 1.0;
            }
        }
        Ok(encoded)
    }

    /// Total number of indicator columns this encoder emits.
    pub fn output_width(&self) -> usize {
        self.categories.iter().map(|c| c.len() - 1).sum()
    }

    /// Indicator column names, `<column>_<category>`, in output order.
    pub fn feature_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .zip(&self.categories)
            .flat_map(|(column, categories)| {
                categories
                    .iter()
                    .skip(1)
                    .map(move |category| format!("{column}_{category}"))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fitted() -> OneHotEncoder {
        OneHotEncoder::fit(
            &["cp", "thal"],
            &[vec![3, 1, 2, 1, 0], vec![1, 1, 2, 3, 1]],
        )
        .unwrap()
    }

    #[test]
    fn fit_sorts_categories_and_drops_first() {
        let encoder = fitted();
        assert_eq!(encoder.output_width(), 3 + 2);
        assert_eq!(
            encoder.feature_names(),
            vec!["cp_1", "cp_2", "cp_3", "thal_2", "thal_3"]
        );
    }

    #[test]
    fn baseline_category_encodes_as_zeros() {
        let encoder = fitted();
        assert_eq!(encoder.transform(&[0, 1]).unwrap(), vec![0.0; 5]);
    }

    #[test]
    fn indicator_position_follows_column_order() {
        let encoder = fitted();
        assert_eq!(
            encoder.transform(&[2, 3]).unwrap(),
            vec![0.0, 1.0, 0.0, 0.0, 1.0]
        );
    }

    #[test]
    fn transform_is_deterministic() {
        let encoder = fitted();
        let first = encoder.transform(&[3, 2]).unwrap();
        let second = encoder.transform(&[3, 2]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn unknown_category_is_rejected() {
        let encoder = fitted();
        let err = encoder.transform(&[3, 7]).unwrap_err();
        assert!(matches!(
            err,
            HeartRiskError::UnknownCategory { column, value: 7 } if column == "thal"
        ));
    }

    #[test]
    fn wrong_arity_is_rejected() {
        let encoder = fitted();
        let err = encoder.transform(&[3]).unwrap_err();
        assert!(matches!(err, HeartRiskError::SchemaMismatch { .. }));
    }

    #[test]
    fn single_category_column_has_zero_width() {
        let encoder = OneHotEncoder::fit(&["slope"], &[vec![1, 1, 1]]).unwrap();
        assert_eq!(encoder.output_width(), 0);
        assert!(encoder.feature_names().is_empty());
        assert_eq!(encoder.transform(&[1]).unwrap(), Vec::<f64>::new());
    }
}
