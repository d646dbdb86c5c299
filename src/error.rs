use std::fmt;
use thiserror::Error;

/// Which measurement field a validation failure refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Weight,
    Height,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Weight => write!(f, "weight"),
            Field::Height => write!(f, "height"),
        }
    }
}

/// Why a measurement was rejected
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeasurementError {
    #[error("Invalid input: could not convert {field} to a number: '{input}'")]
    Unparsable { field: Field, input: String },

    #[error("Invalid input: Weight and height must be positive numbers ({field} was {value})")]
    NotPositive { field: Field, value: f64 },

    #[error("Invalid input: BMI for {weight_kg} kg and {height_cm} cm is not a finite number")]
    NonFiniteBmi { weight_kg: f64, height_cm: f64 },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    InvalidMeasurement(#[from] MeasurementError),

    #[error("Persistence failure: {0}")]
    PersistenceFailure(#[from] rusqlite::Error),

    #[error("Export failed: {0}")]
    Export(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True when the caller should re-prompt for input
    pub fn is_invalid_measurement(&self) -> bool {
        matches!(self, Error::InvalidMeasurement(_))
    }

    pub fn is_persistence_failure(&self) -> bool {
        matches!(
            self,
            Error::PersistenceFailure(_) | Error::Export(_) | Error::Io(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
