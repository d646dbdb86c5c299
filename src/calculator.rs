// Calculation session: parse -> compute -> persist -> read back
// Owns the store handle for the life of the process

use crate::bmi::{compute_measurement, parse_measurement, BmiResult, Measurement};
use crate::db::{HistoryRecord, HistoryStore};
use crate::error::Result;
use std::path::Path;
use tracing::{info, warn};

/// Outcome of one successful calculation
#[derive(Debug, Clone, PartialEq)]
pub struct Calculation {
    pub result: BmiResult,
    pub record: HistoryRecord,
}

impl Calculation {
    /// "Your BMI: 22.86"
    pub fn bmi_line(&self) -> String {
        format!("Your BMI: {:.2}", self.result.bmi)
    }

    /// "Category: Normal weight"
    pub fn category_line(&self) -> String {
        format!("Category: {}", self.result.label())
    }
}

pub struct BmiCalculator {
    store: HistoryStore,
}

impl BmiCalculator {
    pub fn new(store: HistoryStore) -> Self {
        Self { store }
    }

    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(HistoryStore::open(path)?))
    }

    pub fn store(&self) -> &HistoryStore {
        &self.store
    }

    /// Take raw form input, compute and persist
    /// Nothing is written when the input is rejected.
    pub fn calculate(&self, name: &str, weight: &str, height: &str) -> Result<Calculation> {
        let measurement = match parse_measurement(weight, height) {
            Ok(m) => m,
            Err(e) => {
                warn!(weight, height, "rejected measurement: {}", e);
                return Err(e);
            }
        };

        self.record(name, &measurement)
    }

    /// Compute and persist an already-validated measurement
    pub fn record(&self, name: &str, measurement: &Measurement) -> Result<Calculation> {
        let result = compute_measurement(measurement)?;

        let record = self.store.append(
            name,
            measurement.weight_kg,
            measurement.height_m(),
            result.bmi,
            result.label(),
        )?;

        info!(
            id = record.id,
            bmi = %format!("{:.2}", result.bmi),
            category = result.label(),
            "BMI calculated"
        );

        Ok(Calculation { result, record })
    }

    pub fn history(&self) -> Result<Vec<HistoryRecord>> {
        self.store.read_all()
    }

    /// Release the store; consumes the session
    pub fn shutdown(self) -> Result<()> {
        self.store.close()
    }
}
