//! # OTB Math
//!
//! Statistical primitives shared by the inventory planning crates.
//! This crate provides the descriptive statistics and least-squares
//! trend fitting that the forecasting and replenishment engines build on.

use thiserror::Error;

pub mod regression;
pub mod stats;

pub use regression::LinearFit;
pub use stats::{coefficient_of_variation, mean, mean_squared, sample_variance};

/// Errors that can occur in statistical calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for statistical operations
pub type Result<T> = std::result::Result<T, MathError>;
