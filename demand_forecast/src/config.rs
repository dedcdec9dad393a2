//! Forecast configuration
//!
//! A [`ForecastConfig`] can only be obtained through validation, either
//! [`ForecastConfig::new`] or deserialization (which runs the same checks),
//! so the engine never sees weights or windows it cannot honour.

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tolerance for the ensemble weight sum
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Default smoothing factor for exponential smoothing
pub const DEFAULT_SMOOTHING_ALPHA: f64 = 0.3;

/// Default two-sided confidence level for forecast bands
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.90;

/// Forecasting method selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ForecastMethod {
    /// Flat projection of the lookback mean
    MovingAverage,
    /// Simple exponential smoothing
    ExponentialSmoothing,
    /// Least-squares linear trend
    TrendAdjusted,
    /// Weighted blend of the three methods above
    Ensemble,
}

impl ForecastMethod {
    /// The three base methods an ensemble blends, in weight order
    pub const BASE_METHODS: [ForecastMethod; 3] = [
        ForecastMethod::MovingAverage,
        ForecastMethod::ExponentialSmoothing,
        ForecastMethod::TrendAdjusted,
    ];
}

impl fmt::Display for ForecastMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForecastMethod::MovingAverage => write!(f, "Moving Average"),
            ForecastMethod::ExponentialSmoothing => write!(f, "Exponential Smoothing"),
            ForecastMethod::TrendAdjusted => write!(f, "Trend Adjusted"),
            ForecastMethod::Ensemble => write!(f, "Ensemble"),
        }
    }
}

/// Planning scope a configuration applies to
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForecastScope {
    pub brand_id: Option<String>,
    pub category_id: Option<String>,
    pub season_id: Option<String>,
}

/// Unvalidated configuration as supplied by the caller or a config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForecastConfigSpec {
    pub name: String,
    #[serde(default)]
    pub scope: ForecastScope,
    pub primary_method: ForecastMethod,
    pub lookback_weeks: usize,
    pub forecast_weeks: usize,
    #[serde(default)]
    pub moving_avg_weight: f64,
    #[serde(default)]
    pub exp_smooth_weight: f64,
    #[serde(default)]
    pub trend_weight: f64,
    #[serde(default = "default_smoothing_alpha")]
    pub smoothing_alpha: f64,
    #[serde(default = "default_confidence_level")]
    pub confidence_level: f64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_smoothing_alpha() -> f64 {
    DEFAULT_SMOOTHING_ALPHA
}
fn default_confidence_level() -> f64 {
    DEFAULT_CONFIDENCE_LEVEL
}
fn default_true() -> bool {
    true
}

impl Default for ForecastConfigSpec {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            scope: ForecastScope::default(),
            primary_method: ForecastMethod::MovingAverage,
            lookback_weeks: 8,
            forecast_weeks: 4,
            moving_avg_weight: 1.0,
            exp_smooth_weight: 0.0,
            trend_weight: 0.0,
            smoothing_alpha: DEFAULT_SMOOTHING_ALPHA,
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
            is_active: true,
        }
    }
}

/// Validated forecast configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ForecastConfigSpec", into = "ForecastConfigSpec")]
pub struct ForecastConfig {
    spec: ForecastConfigSpec,
}

impl ForecastConfig {
    /// Validate a specification into a usable configuration
    pub fn new(spec: ForecastConfigSpec) -> Result<Self> {
        if spec.lookback_weeks == 0 {
            return Err(ForecastError::InvalidConfig(
                "lookback_weeks must be at least 1".to_string(),
            ));
        }
        if spec.forecast_weeks == 0 {
            return Err(ForecastError::InvalidConfig(
                "forecast_weeks must be at least 1".to_string(),
            ));
        }

        for (label, weight) in [
            ("moving_avg_weight", spec.moving_avg_weight),
            ("exp_smooth_weight", spec.exp_smooth_weight),
            ("trend_weight", spec.trend_weight),
        ] {
            if !(0.0..=1.0).contains(&weight) {
                return Err(ForecastError::InvalidConfig(format!(
                    "{} must be between 0 and 1, got {}",
                    label, weight
                )));
            }
        }

        if spec.primary_method == ForecastMethod::Ensemble {
            let sum = spec.moving_avg_weight + spec.exp_smooth_weight + spec.trend_weight;
            if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
                return Err(ForecastError::InvalidConfig(format!(
                    "Ensemble weights must sum to 1.0, got {}",
                    sum
                )));
            }
        }

        if !(spec.smoothing_alpha > 0.0 && spec.smoothing_alpha <= 1.0) {
            return Err(ForecastError::InvalidConfig(format!(
                "smoothing_alpha must be in (0, 1], got {}",
                spec.smoothing_alpha
            )));
        }
        if !(spec.confidence_level > 0.0 && spec.confidence_level < 1.0) {
            return Err(ForecastError::InvalidConfig(format!(
                "confidence_level must be in (0, 1), got {}",
                spec.confidence_level
            )));
        }

        Ok(Self { spec })
    }

    /// Configuration name
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// Scope the configuration applies to
    pub fn scope(&self) -> &ForecastScope {
        &self.spec.scope
    }

    /// Selected method
    pub fn primary_method(&self) -> ForecastMethod {
        self.spec.primary_method
    }

    /// Weeks of history each method looks at
    pub fn lookback_weeks(&self) -> usize {
        self.spec.lookback_weeks
    }

    /// Weeks to forecast
    pub fn forecast_weeks(&self) -> usize {
        self.spec.forecast_weeks
    }

    /// Smoothing factor for exponential smoothing
    pub fn smoothing_alpha(&self) -> f64 {
        self.spec.smoothing_alpha
    }

    /// Two-sided confidence level of the forecast band
    pub fn confidence_level(&self) -> f64 {
        self.spec.confidence_level
    }

    /// Whether the owning store marks this configuration as active
    pub fn is_active(&self) -> bool {
        self.spec.is_active
    }

    /// Base methods and their blend weights.
    ///
    /// A single-method config passes its method through with weight 1.
    /// Zero-weight ensemble members are left out.
    pub fn method_weights(&self) -> Vec<(ForecastMethod, f64)> {
        match self.spec.primary_method {
            ForecastMethod::Ensemble => ForecastMethod::BASE_METHODS
                .into_iter()
                .zip([
                    self.spec.moving_avg_weight,
                    self.spec.exp_smooth_weight,
                    self.spec.trend_weight,
                ])
                .filter(|(_, w)| *w > 0.0)
                .collect(),
            single => vec![(single, 1.0)],
        }
    }

    /// The validated specification
    pub fn spec(&self) -> &ForecastConfigSpec {
        &self.spec
    }
}

impl TryFrom<ForecastConfigSpec> for ForecastConfig {
    type Error = ForecastError;

    fn try_from(spec: ForecastConfigSpec) -> Result<Self> {
        Self::new(spec)
    }
}

impl From<ForecastConfig> for ForecastConfigSpec {
    fn from(config: ForecastConfig) -> Self {
        config.spec
    }
}

/// Thresholds that decide which forecast insights are raised
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InsightThresholds {
    /// Weekly trend slope, relative to mean demand, that counts as strong
    pub trend_slope_ratio: f64,
    /// Coefficient of variation above which demand is flagged as volatile
    pub volatility_cv: f64,
    /// Back-tested accuracy below which the forecast is flagged as weak
    pub low_accuracy: f64,
}

impl Default for InsightThresholds {
    fn default() -> Self {
        Self {
            trend_slope_ratio: 0.05,
            volatility_cv: 0.5,
            low_accuracy: 0.7,
        }
    }
}
