//! Error types for the replenishment crate

use thiserror::Error;

/// Errors that can occur while monitoring months of cover
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReplenishmentError {
    #[error("Invalid thresholds: {0}")]
    InvalidThresholds(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Data loading error: {0}")]
    DataLoad(String),
}

/// Result type for replenishment operations
pub type Result<T> = std::result::Result<T, ReplenishmentError>;
