//! Weighted combination of the base forecasting methods
//!
//! For a single-method configuration the combiner is a pass-through with
//! weight 1. For an ensemble, both the point forecast and the variance are
//! blended with the configured weights:
//!
//! ```text
//! forecast[i] = w_ma * MA[i] + w_es * ES[i] + w_ta * TA[i]
//! band[i]     = forecast[i] +/- z * sqrt(w_ma * var_ma + w_es * var_es + w_ta * var_ta)
//! ```
//!
//! Accuracy is measured by re-running the same blend on the history minus its
//! last `forecast_weeks` weeks and comparing against what actually sold.

use crate::config::{ForecastConfig, InsightThresholds};
use crate::error::{ForecastError, Result};
use crate::insights::{derive_insights, ForecastInsight};
use crate::metrics::AccuracyMetrics;
use crate::models::{lookback_window, train_method, MethodForecast};
use otb_math::LinearFit;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::debug;

/// Lower and upper bound of the forecast for one week
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBound {
    pub lower: f64,
    pub upper: f64,
}

impl ConfidenceBound {
    /// Width of the band
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// Combined forecast with its band, back-test and insights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleForecast {
    /// Forecasted units per future week
    pub weekly_forecast: Vec<f64>,
    /// Confidence band per future week
    pub confidence_band: Vec<ConfidenceBound>,
    /// Blended variance behind the band
    pub variance: f64,
    /// Individual projections that were blended
    pub components: Vec<MethodForecast>,
    /// Back-test metrics, absent without held-out history
    pub accuracy: Option<AccuracyMetrics>,
    /// Linear trend over the lookback window
    pub trend: LinearFit,
    /// Human-readable observations
    pub insights: Vec<ForecastInsight>,
}

struct Blend {
    values: Vec<f64>,
    variance: f64,
    components: Vec<MethodForecast>,
}

/// Standard normal quantile for a two-sided confidence level
pub fn z_score(confidence_level: f64) -> Result<f64> {
    if !(confidence_level > 0.0 && confidence_level < 1.0) {
        return Err(ForecastError::InvalidConfig(format!(
            "confidence_level must be in (0, 1), got {}",
            confidence_level
        )));
    }

    let normal =
        Normal::new(0.0, 1.0).map_err(|e| ForecastError::InvalidConfig(e.to_string()))?;
    Ok(normal.inverse_cdf(0.5 + confidence_level / 2.0))
}

/// Blends base-method forecasts according to a validated configuration
#[derive(Debug, Clone)]
pub struct EnsembleCombiner<'a> {
    config: &'a ForecastConfig,
    thresholds: InsightThresholds,
}

impl<'a> EnsembleCombiner<'a> {
    /// Create a combiner with default insight thresholds
    pub fn new(config: &'a ForecastConfig) -> Self {
        Self {
            config,
            thresholds: InsightThresholds::default(),
        }
    }

    /// Use custom insight thresholds
    pub fn with_thresholds(mut self, thresholds: InsightThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    fn blend(&self, history: &[f64]) -> Result<Blend> {
        let horizon = self.config.forecast_weeks();
        let mut values = vec![0.0; horizon];
        let mut variance = 0.0;
        let mut components = Vec::new();

        for (method, weight) in self.config.method_weights() {
            let forecast = train_method(method, self.config, history)?.forecast(horizon)?;

            for (acc, v) in values.iter_mut().zip(forecast.values.iter()) {
                *acc += weight * v;
            }
            variance += weight * forecast.variance;
            components.push(forecast);
        }

        // Units sold cannot go negative, whatever a falling trend says
        for v in values.iter_mut() {
            *v = v.max(0.0);
        }

        Ok(Blend {
            values,
            variance,
            components,
        })
    }

    /// Forecast the weeks after the end of `history`
    pub fn forecast(&self, history: &[f64]) -> Result<EnsembleForecast> {
        if let Some(pos) = history.iter().position(|v| !v.is_finite() || *v < 0.0) {
            return Err(ForecastError::InvalidData(format!(
                "Units sold must be non-negative numbers (position {})",
                pos
            )));
        }

        let blend = self.blend(history)?;
        let z = z_score(self.config.confidence_level())?;
        let margin = z * blend.variance.sqrt();

        let confidence_band = blend
            .values
            .iter()
            .map(|&v| ConfidenceBound {
                lower: (v - margin).max(0.0),
                upper: v + margin,
            })
            .collect();

        let accuracy = self.backtest(history)?;

        let window = lookback_window(history, self.config.lookback_weeks())?;
        let trend = LinearFit::fit(window)?;
        let insights = derive_insights(window, &trend, accuracy.as_ref(), &self.thresholds);

        debug!(
            method = %self.config.primary_method(),
            weeks = blend.values.len(),
            variance = blend.variance,
            backtested = accuracy.is_some(),
            "combined forecast"
        );

        Ok(EnsembleForecast {
            weekly_forecast: blend.values,
            confidence_band,
            variance: blend.variance,
            components: blend.components,
            accuracy,
            trend,
            insights,
        })
    }

    /// Re-run the blend with the last `forecast_weeks` weeks held out.
    ///
    /// Returns `None` when the remaining history is shorter than the lookback.
    pub fn backtest(&self, history: &[f64]) -> Result<Option<AccuracyMetrics>> {
        let horizon = self.config.forecast_weeks();
        let lookback = self.config.lookback_weeks();

        if history.len() < lookback + horizon {
            return Ok(None);
        }

        let (train, held_out) = history.split_at(history.len() - horizon);
        let predicted = self.blend(train)?.values;

        AccuracyMetrics::evaluate(&predicted, held_out).map(Some)
    }
}
