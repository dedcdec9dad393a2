//! Forecasting models for weekly demand
//!
//! Each model is trained on the last `lookback_weeks` values of a units-sold
//! history and produces a flat or trending projection together with the
//! variance implied by its fit.

use crate::config::{ForecastConfig, ForecastMethod};
use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

pub mod exponential_smoothing;
pub mod moving_average;
pub mod trend_adjusted;

pub use exponential_smoothing::ExponentialSmoothing;
pub use moving_average::MovingAverage;
pub use trend_adjusted::TrendAdjusted;

/// Projection produced by a single base method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodForecast {
    /// Method that produced the projection
    pub method: ForecastMethod,
    /// Forecasted units per future week
    pub values: Vec<f64>,
    /// Variance implied by the method's fit over the lookback window
    pub variance: f64,
}

/// Trained forecast model
pub trait TrainedForecastModel: Debug {
    /// Generate forecast for future weeks
    fn forecast(&self, horizon: usize) -> Result<MethodForecast>;

    /// Variance implied by the fit
    fn variance(&self) -> f64;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be trained on a units-sold history
pub trait ForecastModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedForecastModel + 'static;

    /// Train the model on history (most recent value last)
    fn train(&self, history: &[f64]) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

/// The trailing `lookback` values of the history
pub fn lookback_window(history: &[f64], lookback: usize) -> Result<&[f64]> {
    if lookback == 0 {
        return Err(ForecastError::InvalidConfig(
            "lookback_weeks must be at least 1".to_string(),
        ));
    }
    if history.len() < lookback {
        return Err(ForecastError::InsufficientHistory {
            required: lookback,
            available: history.len(),
        });
    }
    Ok(&history[history.len() - lookback..])
}

pub(crate) fn check_horizon(horizon: usize) -> Result<()> {
    if horizon == 0 {
        return Err(ForecastError::InvalidConfig(
            "forecast_weeks must be at least 1".to_string(),
        ));
    }
    Ok(())
}

fn boxed<M: ForecastModel>(model: M, history: &[f64]) -> Result<Box<dyn TrainedForecastModel>> {
    Ok(Box::new(model.train(history)?))
}

/// Train one of the base methods as configured
pub fn train_method(
    method: ForecastMethod,
    config: &ForecastConfig,
    history: &[f64],
) -> Result<Box<dyn TrainedForecastModel>> {
    let lookback = config.lookback_weeks();
    match method {
        ForecastMethod::MovingAverage => boxed(MovingAverage::new(lookback)?, history),
        ForecastMethod::ExponentialSmoothing => boxed(
            ExponentialSmoothing::new(lookback, config.smoothing_alpha())?,
            history,
        ),
        ForecastMethod::TrendAdjusted => boxed(TrendAdjusted::new(lookback)?, history),
        ForecastMethod::Ensemble => Err(ForecastError::InvalidConfig(
            "Ensemble is a blend of base methods and cannot be trained directly".to_string(),
        )),
    }
}
