//! # Demand Forecast
//!
//! Weekly demand forecasting for retail planning.
//!
//! ## Features
//!
//! - Weekly observation handling with validation and CSV loading
//! - Forecasting methods (Moving Average, Exponential Smoothing, Trend-Adjusted)
//! - Weighted ensembles with confidence bands
//! - Back-tested accuracy metrics (MAPE, RMSE, accuracy)
//! - Forecast runs with a forward-only lifecycle
//!
//! ## Quick Start
//!
//! ```rust
//! use demand_forecast::config::{ForecastConfig, ForecastConfigSpec, InsightThresholds};
//! use demand_forecast::run::{execute, RunStatus};
//! use demand_forecast::utils::series_from_units;
//!
//! let config = ForecastConfig::new(ForecastConfigSpec::default())?;
//! let first_week = "2024-01-01".parse().expect("valid date");
//! let series = series_from_units("SKU-1", first_week, &[100.0; 12])?;
//!
//! let run = execute(&config, &series, &InsightThresholds::default());
//! assert_eq!(run.status(), RunStatus::Completed);
//! assert_eq!(run.weekly_forecast(), &[100.0; 4]);
//! # Ok::<(), demand_forecast::ForecastError>(())
//! ```

pub mod config;
pub mod data;
pub mod ensemble;
pub mod error;
pub mod insights;
pub mod metrics;
pub mod models;
pub mod run;
pub mod utils;

pub use config::{
    ForecastConfig, ForecastConfigSpec, ForecastMethod, ForecastScope, InsightThresholds,
};
pub use data::{
    InMemoryObservationStore, Observation, ObservationLoader, ObservationSource, WeeklySeries,
};
pub use ensemble::{ConfidenceBound, EnsembleCombiner, EnsembleForecast};
pub use error::{ForecastError, Result};
pub use insights::ForecastInsight;
pub use metrics::AccuracyMetrics;
pub use run::{execute, ForecastRun, RunStatus};
