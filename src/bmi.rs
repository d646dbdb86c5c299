// BMI Engine - formula and classification
// Pure functions only: nothing in here touches the store or the terminal

use crate::error::{Field, MeasurementError, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// CATEGORY
// ============================================================================

/// Upper bound (exclusive) of Underweight, lower bound (inclusive) of Normal weight
pub const NORMAL_LOWER: f64 = 18.5;
/// Lower bound (inclusive) of Overweight
pub const OVERWEIGHT_LOWER: f64 = 25.0;
/// Lower bound (inclusive) of Obesity
pub const OBESITY_LOWER: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    #[serde(rename = "Underweight")]
    Underweight,
    #[serde(rename = "Normal weight")]
    NormalWeight,
    #[serde(rename = "Overweight")]
    Overweight,
    #[serde(rename = "Obesity")]
    Obesity,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Underweight,
        Category::NormalWeight,
        Category::Overweight,
        Category::Obesity,
    ];

    /// Label as stored in the history and shown to the user
    pub fn label(&self) -> &'static str {
        match self {
            Category::Underweight => "Underweight",
            Category::NormalWeight => "Normal weight",
            Category::Overweight => "Overweight",
            Category::Obesity => "Obesity",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .find(|c| c.label() == s)
            .copied()
            .ok_or_else(|| format!("unknown BMI category: {}", s))
    }
}

/// Classify a BMI value. Lower bounds are inclusive, evaluated low to high.
pub fn classify(bmi: f64) -> Category {
    if bmi < NORMAL_LOWER {
        Category::Underweight
    } else if bmi < OVERWEIGHT_LOWER {
        Category::NormalWeight
    } else if bmi < OBESITY_LOWER {
        Category::Overweight
    } else {
        Category::Obesity
    }
}

// ============================================================================
// MEASUREMENT & RESULT
// ============================================================================

/// Caller input: kilograms and centimeters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub weight_kg: f64,
    pub height_cm: f64,
}

impl Measurement {
    /// Validates both values; rejects zero, negatives, NaN and infinities
    pub fn new(weight_kg: f64, height_cm: f64) -> Result<Self> {
        check_positive(Field::Weight, weight_kg)?;
        check_positive(Field::Height, height_cm)?;
        Ok(Self { weight_kg, height_cm })
    }

    pub fn height_m(&self) -> f64 {
        self.height_cm / 100.0
    }
}

fn check_positive(field: Field, value: f64) -> std::result::Result<(), MeasurementError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(MeasurementError::NotPositive { field, value })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BmiResult {
    /// Unrounded; formatting is left to the display
    pub bmi: f64,
    pub category: Category,
}

impl BmiResult {
    pub fn label(&self) -> &'static str {
        self.category.label()
    }
}

// ============================================================================
// OPERATIONS
// ============================================================================

/// bmi = weight_kg / (height_cm / 100)^2
pub fn compute(weight_kg: f64, height_cm: f64) -> Result<BmiResult> {
    let measurement = Measurement::new(weight_kg, height_cm)?;
    compute_measurement(&measurement)
}

/// Fails when the inputs are valid but the quotient overflows (e.g. 1e308 kg at 1e-200 cm)
pub fn compute_measurement(measurement: &Measurement) -> Result<BmiResult> {
    let meters = measurement.height_m();
    let bmi = measurement.weight_kg / (meters * meters);

    if !bmi.is_finite() {
        return Err(MeasurementError::NonFiniteBmi {
            weight_kg: measurement.weight_kg,
            height_cm: measurement.height_cm,
        }
        .into());
    }

    Ok(BmiResult {
        bmi,
        category: classify(bmi),
    })
}

/// Parse raw text fields (kg, cm) into a validated Measurement
pub fn parse_measurement(weight: &str, height: &str) -> Result<Measurement> {
    let weight_kg = parse_number(Field::Weight, weight)?;
    let height_cm = parse_number(Field::Height, height)?;
    Measurement::new(weight_kg, height_cm)
}

fn parse_number(field: Field, input: &str) -> std::result::Result<f64, MeasurementError> {
    input
        .trim()
        .parse::<f64>()
        .map_err(|_| MeasurementError::Unparsable {
            field,
            input: input.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    const EPS: f64 = 1e-9;

    fn assert_bmi(weight: f64, height: f64, expected: f64, category: Category) {
        let result = compute(weight, height).unwrap();
        assert!(
            (result.bmi - expected).abs() < 0.01,
            "bmi for {}kg/{}cm was {}, expected ~{}",
            weight,
            height,
            result.bmi,
            expected
        );
        assert_eq!(result.category, category);
    }

    #[test]
    fn test_reference_scenarios() {
        assert_bmi(70.0, 175.0, 22.86, Category::NormalWeight);
        assert_bmi(50.0, 160.0, 19.53, Category::NormalWeight);
        assert_bmi(45.0, 170.0, 15.57, Category::Underweight);
        assert_bmi(100.0, 170.0, 34.60, Category::Obesity);
    }

    #[test]
    fn test_formula_matches_definition() {
        for (w, h) in [(1.0, 1.0), (62.3, 158.0), (250.0, 210.5), (0.5, 40.0)] {
            let result = compute(w, h).unwrap();
            let expected = w / ((h / 100.0) * (h / 100.0));
            assert!((result.bmi - expected).abs() < EPS);
            assert_eq!(result.category, classify(result.bmi));
        }
    }

    #[test]
    fn test_boundaries_resolve_upward() {
        // 100 cm makes bmi == weight exactly
        assert_eq!(compute(18.5, 100.0).unwrap().category, Category::NormalWeight);
        assert_eq!(compute(25.0, 100.0).unwrap().category, Category::Overweight);
        assert_eq!(compute(30.0, 100.0).unwrap().category, Category::Obesity);

        assert_eq!(classify(18.499_999), Category::Underweight);
        assert_eq!(classify(24.999_999), Category::NormalWeight);
        assert_eq!(classify(29.999_999), Category::Overweight);
    }

    #[test]
    fn test_non_positive_inputs_rejected() {
        for (w, h) in [(-5.0, 170.0), (0.0, 170.0), (70.0, 0.0), (70.0, -1.0), (0.0, 0.0)] {
            let err = compute(w, h).unwrap_err();
            assert!(err.is_invalid_measurement(), "{}kg/{}cm should be invalid", w, h);
        }
    }

    #[test]
    fn test_non_finite_inputs_rejected() {
        assert!(compute(f64::NAN, 170.0).is_err());
        assert!(compute(70.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_overflowing_bmi_rejected() {
        let err = compute(1e308, 1e-200).unwrap_err();
        assert!(err.is_invalid_measurement());
        assert!(matches!(
            err,
            Error::InvalidMeasurement(MeasurementError::NonFiniteBmi { .. })
        ));

        // Large but representable values still go through
        let huge = compute(1e6, 1.0).unwrap();
        assert!(huge.bmi.is_finite());
        assert_eq!(huge.category, Category::Obesity);
    }

    #[test]
    fn test_parse_measurement() {
        let m = parse_measurement(" 70 ", "175.0\n").unwrap();
        assert_eq!(m.weight_kg, 70.0);
        assert!((m.height_m() - 1.75).abs() < EPS);

        match parse_measurement("seventy", "175") {
            Err(Error::InvalidMeasurement(MeasurementError::Unparsable { field, input })) => {
                assert_eq!(field, Field::Weight);
                assert_eq!(input, "seventy");
            }
            other => panic!("expected unparsable weight, got {:?}", other),
        }

        match parse_measurement("70", "") {
            Err(Error::InvalidMeasurement(MeasurementError::Unparsable { field, .. })) => {
                assert_eq!(field, Field::Height);
            }
            other => panic!("expected unparsable height, got {:?}", other),
        }

        assert!(parse_measurement("-5", "170").unwrap_err().is_invalid_measurement());
    }

    #[test]
    fn test_error_message_is_human_readable() {
        let err = parse_measurement("abc", "170").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid input: could not convert weight to a number: 'abc'"
        );

        // The wrapper adds no second copy of the message to the error chain
        assert!(std::error::Error::source(&err).is_none());
        let chain = anyhow::Error::from(err);
        assert_eq!(chain.chain().count(), 1);
    }

    #[test]
    fn test_category_labels_round_trip() {
        for category in Category::ALL {
            assert_eq!(category.label().parse::<Category>().unwrap(), category);
        }
        assert!("Normal".parse::<Category>().is_err());
    }
}
