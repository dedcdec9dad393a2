//! Error types for the demand_forecast crate

use crate::run::RunStatus;
use otb_math::MathError;
use thiserror::Error;

/// Custom error types for the demand_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Configuration rejected before any computation ran
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Fewer observations than the lookback window needs
    #[error("Insufficient history: need at least {required} weekly observations, got {available}")]
    InsufficientHistory { required: usize, available: usize },

    /// Error related to observation validation
    #[error("Data error: {0}")]
    InvalidData(String),

    /// Forecast run lifecycle violation
    #[error("Invalid run transition from {from:?} to {to:?}")]
    InvalidTransition { from: RunStatus, to: RunStatus },

    /// Error from mathematical operations
    #[error("Math error: {0}")]
    Math(#[from] MathError),

    /// Error from CSV parsing
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;
