//! Engine configuration loaded from TOML
//!
//! Every section is optional; missing keys fall back to the engine defaults.
//!
//! ```toml
//! [forecast]
//! confidence_level = 0.9
//! smoothing_alpha = 0.3
//!
//! [forecast.insights]
//! trend_slope_ratio = 0.05
//!
//! [markdown]
//! uplift_per_markdown_point = 2.0
//! staleness_multiplier = 2.0
//!
//! [replenishment]
//! warning_ratio = 0.8
//! ```

use crate::error::{EngineError, Result};
use demand_forecast::config::{DEFAULT_CONFIDENCE_LEVEL, DEFAULT_SMOOTHING_ALPHA};
use demand_forecast::{ForecastConfig, ForecastConfigSpec, ForecastMethod, InsightThresholds};
use markdown_engine::OptimizerSettings;
use replenishment::MonitorSettings;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Defaults for forecast configurations built by the engine
    #[serde(default)]
    pub forecast: ForecastSection,

    /// Markdown optimizer heuristics
    #[serde(default)]
    pub markdown: OptimizerSettings,

    /// Replenishment monitor thresholds
    #[serde(default)]
    pub replenishment: MonitorSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForecastSection {
    #[serde(default = "default_confidence_level")]
    pub confidence_level: f64,
    #[serde(default = "default_smoothing_alpha")]
    pub smoothing_alpha: f64,
    #[serde(default)]
    pub insights: InsightThresholds,
}

impl Default for ForecastSection {
    fn default() -> Self {
        Self {
            confidence_level: default_confidence_level(),
            smoothing_alpha: default_smoothing_alpha(),
            insights: InsightThresholds::default(),
        }
    }
}

fn default_confidence_level() -> f64 {
    DEFAULT_CONFIDENCE_LEVEL
}
fn default_smoothing_alpha() -> f64 {
    DEFAULT_SMOOTHING_ALPHA
}

impl ForecastSection {
    /// Build a validated forecast configuration using this section's defaults.
    ///
    /// `weights` are `(moving average, exponential smoothing, trend)` and only
    /// matter for [`ForecastMethod::Ensemble`]; single methods get weight 1.
    pub fn forecast_config(
        &self,
        name: &str,
        method: ForecastMethod,
        lookback_weeks: usize,
        forecast_weeks: usize,
        weights: Option<(f64, f64, f64)>,
    ) -> Result<ForecastConfig> {
        let (moving_avg_weight, exp_smooth_weight, trend_weight) = match method {
            ForecastMethod::MovingAverage => (1.0, 0.0, 0.0),
            ForecastMethod::ExponentialSmoothing => (0.0, 1.0, 0.0),
            ForecastMethod::TrendAdjusted => (0.0, 0.0, 1.0),
            ForecastMethod::Ensemble => weights.ok_or_else(|| {
                EngineError::InvalidConfig("Ensemble forecasts need explicit weights".to_string())
            })?,
        };

        let config = ForecastConfig::new(ForecastConfigSpec {
            name: name.to_string(),
            primary_method: method,
            lookback_weeks,
            forecast_weeks,
            moving_avg_weight,
            exp_smooth_weight,
            trend_weight,
            smoothing_alpha: self.smoothing_alpha,
            confidence_level: self.confidence_level,
            ..ForecastConfigSpec::default()
        })?;
        Ok(config)
    }
}

impl EngineConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Check every section before any engine runs
    pub fn validate(&self) -> Result<()> {
        self.forecast
            .forecast_config("validation", ForecastMethod::MovingAverage, 1, 1, None)?;
        self.markdown.validate()?;
        self.replenishment.validate()?;
        Ok(())
    }
}
