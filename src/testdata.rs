//! Deterministic fixtures shared by the unit tests.

use crate::records::PatientRecord;

/// The worked example row: a 63-year-old male with cp=3, thal=1.
pub fn example_record() -> PatientRecord {
    PatientRecord::from_slice(&[
        63.0, 1.0, 3.0, 145.0, 233.0, 1.0, 0.0, 150.0, 0.0, 2.3, 0.0, 0.0, 1.0,
    ])
    .unwrap()
}

/// Forty synthetic patients with labels correlated to thalach/oldpeak.
/// The categorical codes cycle through the full clinical domains so the
/// fitted encoder accepts every valid code, including the example record's.
pub fn synthetic_records() -> (Vec<PatientRecord>, Vec<i32>) {
    let mut records = Vec::new();
    let mut labels = Vec::new();
    for i in 0..40i64 {
        let label = (i % 2) as i32;
        records.push(PatientRecord {
            age: 45.0 + (i % 20) as f64,
            sex: (i % 2) as f64,
            cp: i % 4,
            trestbps: 120.0 + (i % 5) as f64 * 4.0,
            chol: 200.0 + (i % 7) as f64 * 10.0,
            fbs: ((i / 2) % 2) as f64,
            restecg: i % 3,
            thalach: 130.0 + f64::from(label) * 30.0 + (i % 5) as f64,
            exang: ((i / 3) % 2) as f64,
            oldpeak: 0.5 + f64::from(1 - label) * 1.5 + (i % 4) as f64 * 0.1,
            slope: i % 3,
            ca: i % 5,
            thal: i % 4,
        });
        labels.push(label);
    }
    (records, labels)
}
