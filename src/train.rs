use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use log::{debug, info};
use polars::prelude::*;
use smartcore::linalg::basic::arrays::MutArray;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::logistic_regression::LogisticRegression;
use smartcore::metrics::accuracy;

use crate::encoder::OneHotEncoder;
use crate::error::HeartRiskError;
use crate::features::{encode_record, feature_columns};
use crate::model::HeartModel;
use crate::records::{PatientRecord, CATEGORICAL_COLUMNS, RAW_COLUMNS, TARGET_COLUMN};

/// Reads the training dataset with the dataset schema applied.
pub async fn read_csv<P: AsRef<Path>>(path: P) -> Result<DataFrame, HeartRiskError> {
    let file = File::open(path)?;
    let df = CsvReader::new(file)
        .has_header(true)
        .with_dtypes(Some(Arc::new(PatientRecord::raw_schema())))
        .finish()?;
    Ok(df)
}

/// Materializes the dataframe into patient records plus binary labels.
/// Missing columns, null cells and non-binary labels are all fatal.
fn dataset_records(df: &DataFrame) -> Result<(Vec<PatientRecord>, Vec<i32>), HeartRiskError> {
    for name in RAW_COLUMNS.iter().chain(std::iter::once(&TARGET_COLUMN)) {
        if df.column(name).is_err() {
            return Err(HeartRiskError::MissingColumn {
                name: (*name).to_string(),
            });
        }
    }
    let mut columns = Vec::with_capacity(RAW_COLUMNS.len());
    for name in RAW_COLUMNS {
        columns.push(df.column(name)?.f64()?);
    }
    let target = df.column(TARGET_COLUMN)?.i64()?;

    let mut records = Vec::with_capacity(df.height());
    let mut labels = Vec::with_capacity(df.height());
    let mut raw = [0.0f64; 13];
    for row in 0..df.height() {
        for (j, column) in columns.iter().enumerate() {
            raw[j] = column.get(row).ok_or_else(|| HeartRiskError::MissingValue {
                column: RAW_COLUMNS[j].to_string(),
                row,
            })?;
        }
        records.push(PatientRecord::from_slice(&raw)?);

        let label = target.get(row).ok_or_else(|| HeartRiskError::MissingValue {
            column: TARGET_COLUMN.to_string(),
            row,
        })?;
        if label != 0 && label != 1 {
            return Err(HeartRiskError::InvalidValue {
                column: TARGET_COLUMN.to_string(),
                value: label as f64,
            });
        }
        labels.push(label as i32);
    }
    Ok((records, labels))
}

/// Fits the one-hot encoder on the full training set, once, before any
/// serving use.
pub(crate) fn fit_encoder(records: &[PatientRecord]) -> Result<OneHotEncoder, HeartRiskError> {
    let columns: Vec<Vec<i64>> = (0..CATEGORICAL_COLUMNS.len())
        .map(|c| records.iter().map(|r| r.categorical_values()[c]).collect())
        .collect();
    OneHotEncoder::fit(&CATEGORICAL_COLUMNS, &columns)
}

/// Packs encoded rows into a matrix readable by smartcore.
pub(crate) fn to_dense_matrix(rows: &[Vec<f64>]) -> DenseMatrix<f64> {
    let nrows = rows.len();
    let ncols = rows.first().map_or(0, Vec::len);
    let mut matrix = DenseMatrix::new(nrows, ncols, vec![0.0; nrows * ncols], true);
    for (i, row) in rows.iter().enumerate() {
        for (j, value) in row.iter().enumerate() {
            matrix.set((i, j), *value);
        }
    }
    matrix
}

/// Training procedure: dataset in, three artifacts out.
pub async fn train(input: &Path, artifacts_dir: &Path) -> Result<(), HeartRiskError> {
    let df = read_csv(input).await?;
    info!("loaded {} rows from {}", df.height(), input.display());

    let (records, target) = dataset_records(&df)?;
    if records.is_empty() {
        return Err(HeartRiskError::EmptyDataset);
    }

    let encoder = fit_encoder(&records)?;
    let columns = feature_columns(&encoder);
    debug!("feature columns: {:?}", columns);

    let rows = records
        .iter()
        .map(|record| encode_record(record, &encoder))
        .collect::<Result<Vec<_>, _>>()?;
    let x = to_dense_matrix(&rows);
    let model = LogisticRegression::fit(&x, &target, Default::default())?;

    let predictions = model.predict(&x)?;
    info!("training accuracy: {:.3}", accuracy(&target, &predictions));

    let artifacts = HeartModel::new(model, encoder, columns)?;
    artifacts.save(artifacts_dir)?;
    info!("artifacts written to {}", artifacts_dir.display());
    Ok(())
}
