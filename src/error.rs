//! Error type of the engine facade

use demand_forecast::ForecastError;
use markdown_engine::MarkdownError;
use replenishment::ReplenishmentError;
use thiserror::Error;

/// Errors surfaced by [`crate::InventoryDecisionEngine`]
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Forecast(#[from] ForecastError),

    #[error(transparent)]
    Markdown(#[from] MarkdownError),

    #[error(transparent)]
    Replenishment(#[from] ReplenishmentError),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
