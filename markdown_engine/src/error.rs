//! Error types for the markdown_engine crate

use crate::plan::PlanStatus;
use demand_forecast::ForecastError;
use thiserror::Error;

/// Errors that can occur while validating or optimizing markdown plans
#[derive(Debug, Error)]
pub enum MarkdownError {
    /// Structural problem in a plan or its phases
    #[error("Invalid plan: {0}")]
    InvalidPlan(String),

    /// Optimizer or plan setting outside its allowed range
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Malformed SKU snapshot, override or scenario
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Plan lifecycle violation
    #[error("Invalid plan transition from {from:?} to {to:?}")]
    InvalidTransition { from: PlanStatus, to: PlanStatus },

    #[error("Forecast error: {0}")]
    Forecast(#[from] ForecastError),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, MarkdownError>;
