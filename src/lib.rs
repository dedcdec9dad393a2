//! # OTB Engine
//!
//! `otb_engine` is the inventory decision engine behind open-to-buy planning.
//! It ties together the workspace crates:
//!
//! - [`demand_forecast`]: weekly demand forecasts with confidence bands and
//!   back-tested accuracy
//! - [`markdown_engine`]: markdown and clearance recommendations per SKU, plus
//!   what-if simulation
//! - [`replenishment`]: months-of-cover monitoring and replenishment alerts
//!
//! ## Example
//!
//! ```
//! use otb_engine::{EngineConfig, InventoryDecisionEngine};
//! use otb_engine::demand_forecast::{ForecastMethod, InMemoryObservationStore, RunStatus};
//!
//! let engine = InventoryDecisionEngine::new(EngineConfig::default())?;
//! let config = engine
//!     .config()
//!     .forecast
//!     .forecast_config("weekly", ForecastMethod::MovingAverage, 8, 4, None)?;
//!
//! let store = InMemoryObservationStore::new();
//! let runs = engine.forecast(&config, &store, &["SKU-1"])?;
//! assert_eq!(runs[0].status(), RunStatus::Failed);
//! # Ok::<(), otb_engine::EngineError>(())
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod logging;

pub use config::{EngineConfig, ForecastSection};
pub use engine::{InventoryDecisionEngine, WhatIfReport};
pub use error::{EngineError, Result};

pub use demand_forecast;
pub use markdown_engine;
pub use otb_math;
pub use replenishment;
