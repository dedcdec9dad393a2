//! Exponential smoothing model for weekly demand

use crate::config::ForecastMethod;
use crate::error::{ForecastError, Result};
use crate::models::{
    check_horizon, lookback_window, ForecastModel, MethodForecast, TrainedForecastModel,
};
use otb_math::mean_squared;

/// Simple exponential smoothing model
#[derive(Debug, Clone)]
pub struct ExponentialSmoothing {
    /// Name of the model
    name: String,
    /// Window size
    window: usize,
    /// Smoothing parameter
    alpha: f64,
}

/// Trained exponential smoothing model
#[derive(Debug, Clone)]
pub struct TrainedExponentialSmoothing {
    /// Name of the model
    name: String,
    /// Final smoothed level
    level: f64,
    /// Mean squared one-step-ahead error over the window
    variance: f64,
}

impl ExponentialSmoothing {
    /// Create a new exponential smoothing model
    pub fn new(window: usize, alpha: f64) -> Result<Self> {
        if window == 0 {
            return Err(ForecastError::InvalidConfig(
                "Window size must be positive".to_string(),
            ));
        }
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(ForecastError::InvalidConfig(
                "Alpha must be in (0, 1]".to_string(),
            ));
        }

        Ok(Self {
            name: format!("Exponential Smoothing (window={}, alpha={})", window, alpha),
            window,
            alpha,
        })
    }
}

/// Smoothed level after each observation, seeded with the first value
fn smoothed_levels(window: &[f64], alpha: f64) -> Vec<f64> {
    let mut levels = Vec::with_capacity(window.len());
    let mut level = window[0];
    levels.push(level);

    for &value in &window[1..] {
        level = alpha * value + (1.0 - alpha) * level;
        levels.push(level);
    }

    levels
}

impl ForecastModel for ExponentialSmoothing {
    type Trained = TrainedExponentialSmoothing;

    fn train(&self, history: &[f64]) -> Result<Self::Trained> {
        let window = lookback_window(history, self.window)?;
        let levels = smoothed_levels(window, self.alpha);

        // One-step-ahead residuals: the level before each observation predicts it
        let residuals: Vec<f64> = window
            .iter()
            .skip(1)
            .zip(levels.iter())
            .map(|(actual, previous_level)| actual - previous_level)
            .collect();

        let variance = if residuals.is_empty() {
            0.0
        } else {
            mean_squared(&residuals)?
        };

        Ok(TrainedExponentialSmoothing {
            name: self.name.clone(),
            level: levels[levels.len() - 1],
            variance,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedExponentialSmoothing {
    /// Final smoothed level
    pub fn level(&self) -> f64 {
        self.level
    }
}

impl TrainedForecastModel for TrainedExponentialSmoothing {
    fn forecast(&self, horizon: usize) -> Result<MethodForecast> {
        check_horizon(horizon)?;

        // In simple exponential smoothing, the forecast is constant at the last level
        Ok(MethodForecast {
            method: ForecastMethod::ExponentialSmoothing,
            values: vec![self.level; horizon],
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
