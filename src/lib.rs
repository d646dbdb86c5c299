// BMI Tracker - Core Library
// Exposes the engine and history store for the CLI, the terminal UI, and tests

pub mod bmi;
pub mod calculator;
pub mod chart;
pub mod db;
pub mod error;

// Re-export commonly used types
pub use bmi::{
    classify, compute, compute_measurement, parse_measurement,
    BmiResult, Category, Measurement,
};
pub use calculator::{BmiCalculator, Calculation};
pub use chart::{
    gauge_segments, needle_angle, needle_column, needle_fraction,
    trend_bounds, trend_points, trend_series,
    GaugeSegment, SegmentColor, TrendPoint, GAUGE_MAX, GAUGE_MIN,
};
pub use db::{setup_database, write_csv, HistoryRecord, HistoryStore, TIMESTAMP_FORMAT};
pub use error::{Error, Field, MeasurementError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default database file, relative to the working directory
pub const DEFAULT_DB_PATH: &str = "bmi_calculator.db";
