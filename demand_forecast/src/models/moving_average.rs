//! Moving average model for weekly demand

use crate::config::ForecastMethod;
use crate::error::{ForecastError, Result};
use crate::models::{
    check_horizon, lookback_window, ForecastModel, MethodForecast, TrainedForecastModel,
};
use otb_math::{mean, sample_variance};

/// Simple Moving Average model
#[derive(Debug, Clone)]
pub struct MovingAverage {
    /// Name of the model
    name: String,
    /// Window size
    window: usize,
}

/// Trained Simple Moving Average model
#[derive(Debug, Clone)]
pub struct TrainedMovingAverage {
    /// Name of the model
    name: String,
    /// Mean of the window
    average: f64,
    /// Sample variance of the window
    variance: f64,
}

impl MovingAverage {
    /// Create a new Simple Moving Average model
    pub fn new(window: usize) -> Result<Self> {
        if window == 0 {
            return Err(ForecastError::InvalidConfig(
                "Window size must be positive".to_string(),
            ));
        }

        Ok(Self {
            name: format!("Moving Average (window={})", window),
            window,
        })
    }
}

impl ForecastModel for MovingAverage {
    type Trained = TrainedMovingAverage;

    fn train(&self, history: &[f64]) -> Result<Self::Trained> {
        let window = lookback_window(history, self.window)?;

        Ok(TrainedMovingAverage {
            name: self.name.clone(),
            average: mean(window)?,
            variance: sample_variance(window)?,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedMovingAverage {
    /// Mean of the training window
    pub fn average(&self) -> f64 {
        self.average
    }
}

impl TrainedForecastModel for TrainedMovingAverage {
    fn forecast(&self, horizon: usize) -> Result<MethodForecast> {
        check_horizon(horizon)?;

        // For moving average, the forecast is constant at the window mean
        Ok(MethodForecast {
            method: ForecastMethod::MovingAverage,
            values: vec![self.average; horizon],
            variance: self.variance,
        })
    }

    fn variance(&self) -> f64 {
        self.variance
    }

    fn name(&self) -> &str {
        &self.name
    }
}
