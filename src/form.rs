use std::io::{BufRead, Write};

use crate::error::HeartRiskError;
use crate::model::Prediction;
use crate::records::PatientRecord;

/// One form field: prompt label, default value and accepted domain.
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub default: f64,
    pub domain: Domain,
}

pub enum Domain {
    /// Integer within an inclusive range.
    Range { min: i64, max: i64 },
    /// One of an explicit set of integer codes.
    Choice(&'static [i64]),
    /// Any integer.
    Integer,
    /// Any finite real.
    Real,
}

impl Domain {
    fn accepts(&self, value: f64) -> bool {
        match self {
            Domain::Range { min, max } => {
                is_integral(value) && (*min..=*max).contains(&(value as i64))
            }
            Domain::Choice(codes) => is_integral(value) && codes.contains(&(value as i64)),
            Domain::Integer => is_integral(value),
            Domain::Real => value.is_finite(),
        }
    }

    fn describe(&self) -> String {
        match self {
            Domain::Range { min, max } => format!("an integer in [{min}, {max}]"),
            Domain::Choice(codes) => format!("one of {codes:?}"),
            Domain::Integer => "an integer".to_string(),
            Domain::Real => "a number".to_string(),
        }
    }
}

fn is_integral(value: f64) -> bool {
    value.is_finite() && value.fract() == 0.0
}

/// The 13 prompts, in dataset column order.
pub const FORM_FIELDS: [FieldSpec; 13] = [
    FieldSpec {
        name: "age",
        label: "Age",
        default: 50.0,
        domain: Domain::Range { min: 1, max: 120 },
    },
    FieldSpec {
        name: "sex",
        label: "Sex (0 = female, 1 = male)",
        default: 0.0,
        domain: Domain::Choice(&[0, 1]),
    },
    FieldSpec {
        name: "cp",
        label: "Chest Pain Type (cp)",
        default: 0.0,
        domain: Domain::Choice(&[0, 1, 2, 3]),
    },
    FieldSpec {
        name: "trestbps",
        label: "Resting Blood Pressure (trestbps)",
        default: 120.0,
        domain: Domain::Integer,
    },
    FieldSpec {
        name: "chol",
        label: "Serum Cholesterol (chol)",
        default: 200.0,
        domain: Domain::Integer,
    },
    FieldSpec {
        name: "fbs",
        label: "Fasting Blood Sugar > 120 mg/dl (fbs)",
        default: 0.0,
        domain: Domain::Choice(&[0, 1]),
    },
    FieldSpec {
        name: "restecg",
        label: "Resting ECG results (restecg)",
        default: 0.0,
        domain: Domain::Choice(&[0, 1, 2]),
    },
    FieldSpec {
        name: "thalach",
        label: "Maximum Heart Rate Achieved (thalach)",
        default: 150.0,
        domain: Domain::Integer,
    },
    FieldSpec {
        name: "exang",
        label: "Exercise Induced Angina (exang)",
        default: 0.0,
        domain: Domain::Choice(&[0, 1]),
    },
    FieldSpec {
        name: "oldpeak",
        label: "ST depression (oldpeak)",
        default: 1.0,
        domain: Domain::Real,
    },
    FieldSpec {
        name: "slope",
        label: "Slope of peak exercise ST segment (slope)",
        default: 0.0,
        domain: Domain::Choice(&[0, 1, 2]),
    },
    FieldSpec {
        name: "ca",
        label: "Number of major vessels (ca)",
        default: 0.0,
        domain: Domain::Choice(&[0, 1, 2, 3, 4]),
    },
    FieldSpec {
        name: "thal",
        label: "Thalassemia (thal)",
        default: 0.0,
        domain: Domain::Choice(&[0, 1, 2, 3]),
    },
];

/// Prompts for all 13 fields in order and assembles the patient record.
/// Empty input takes the field default; out-of-domain input re-prompts;
/// EOF aborts the form.
pub fn read_record<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> Result<PatientRecord, HeartRiskError> {
    let mut values = Vec::with_capacity(FORM_FIELDS.len());
    for field in &FORM_FIELDS {
        values.push(prompt_field(input, output, field)?);
    }
    PatientRecord::from_slice(&values)
}

fn prompt_field<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    field: &FieldSpec,
) -> Result<f64, HeartRiskError> {
    loop {
        write!(output, "{} [{}]: ", field.label, field.default)?;
        output.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(HeartRiskError::FormAborted);
        }
        let line = line.trim();
        if line.is_empty() {
            return Ok(field.default);
        }
        let value = match line.parse::<f64>() {
            Ok(value) => value,
            Err(_) => {
                writeln!(output, "please enter a number")?;
                continue;
            }
        };
        if field.domain.accepts(value) {
            return Ok(value);
        }
        writeln!(output, "{} must be {}", field.name, field.domain.describe())?;
    }
}

/// Parses the `--record v1,...,v13` form of input.
pub fn parse_record_arg(raw: &str) -> Result<PatientRecord, HeartRiskError> {
    let values = raw
        .split(',')
        .map(|value| value.trim().parse::<f64>())
        .collect::<Result<Vec<f64>, _>>()?;
    PatientRecord::from_slice(&values)
}

pub fn render(prediction: &Prediction) -> String {
    format!(
        "Prediction: {}\nPrediction Probability: {:.2}",
        prediction.diagnosis, prediction.probability
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Diagnosis;
    use std::io::Cursor;

    fn run_form(input: &str) -> Result<PatientRecord, HeartRiskError> {
        let mut output = Vec::new();
        read_record(&mut Cursor::new(input), &mut output)
    }

    #[test]
    fn empty_input_takes_defaults() {
        let record = run_form(&"\n".repeat(13)).unwrap();
        assert_eq!(record.age, 50.0);
        assert_eq!(record.trestbps, 120.0);
        assert_eq!(record.chol, 200.0);
        assert_eq!(record.thalach, 150.0);
        assert_eq!(record.oldpeak, 1.0);
        assert_eq!(record.categorical_values(), [0, 0, 0, 0, 0]);
    }

    #[test]
    fn typed_values_override_defaults() {
        let record = run_form("63\n1\n3\n145\n233\n1\n0\n150\n0\n2.3\n0\n0\n1\n").unwrap();
        assert_eq!(record.age, 63.0);
        assert_eq!(record.cp, 3);
        assert_eq!(record.oldpeak, 2.3);
        assert_eq!(record.thal, 1);
    }

    #[test]
    fn out_of_domain_input_reprompts() {
        // First age is rejected (out of range), second accepted.
        let input = format!("500\n63\n{}", "\n".repeat(12));
        let mut output = Vec::new();
        let record = read_record(&mut Cursor::new(input.as_str()), &mut output).unwrap();
        assert_eq!(record.age, 63.0);
        let transcript = String::from_utf8(output).unwrap();
        assert!(transcript.contains("age must be an integer in [1, 120]"));
    }

    #[test]
    fn garbage_input_reprompts() {
        let input = format!("abc\n63\n{}", "\n".repeat(12));
        let mut output = Vec::new();
        let record = read_record(&mut Cursor::new(input.as_str()), &mut output).unwrap();
        assert_eq!(record.age, 63.0);
        let transcript = String::from_utf8(output).unwrap();
        assert!(transcript.contains("please enter a number"));
    }

    #[test]
    fn eof_aborts_the_form() {
        let err = run_form("63\n1\n").unwrap_err();
        assert!(matches!(err, HeartRiskError::FormAborted));
    }

    #[test]
    fn record_arg_parses_in_column_order() {
        let record = parse_record_arg("63,1,3,145,233,1,0,150,0,2.3,0,0,1").unwrap();
        assert_eq!(record.age, 63.0);
        assert_eq!(record.categorical_values(), [3, 0, 0, 1, 0]);
    }

    #[test]
    fn record_arg_with_wrong_arity_is_rejected() {
        let err = parse_record_arg("63,1,3").unwrap_err();
        assert!(matches!(
            err,
            HeartRiskError::SchemaMismatch {
                expected: 13,
                actual: 3
            }
        ));
    }

    #[test]
    fn record_arg_with_garbage_is_rejected() {
        let err = parse_record_arg("63,xyz,3").unwrap_err();
        assert!(matches!(err, HeartRiskError::NumberFormat { .. }));
    }

    #[test]
    fn render_rounds_probability_to_two_decimals() {
        let rendered = render(&Prediction {
            diagnosis: Diagnosis::Positive,
            probability: 0.875,
        });
        assert_eq!(
            rendered,
            "Prediction: Positive for Heart Disease\nPrediction Probability: 0.88"
        );
    }
}
