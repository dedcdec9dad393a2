//! Trend-adjusted model: least-squares line over the lookback window

use crate::config::ForecastMethod;
use crate::error::{ForecastError, Result};
use crate::models::{
    check_horizon, lookback_window, ForecastModel, MethodForecast, TrainedForecastModel,
};
use otb_math::LinearFit;

/// Linear trend model
#[derive(Debug, Clone)]
pub struct TrendAdjusted {
    name: String,
    window: usize,
}

/// Trained linear trend model
#[derive(Debug, Clone)]
pub struct TrainedTrendAdjusted {
    name: String,
    fit: LinearFit,
}

impl TrendAdjusted {
    /// Create a new trend model over `window` weeks
    pub fn new(window: usize) -> Result<Self> {
        if window == 0 {
            return Err(ForecastError::InvalidConfig(
                "Window size must be positive".to_string(),
            ));
        }

        Ok(Self {
            name: format!("Trend Adjusted (window={})", window),
            window,
        })
    }
}

impl ForecastModel for TrendAdjusted {
    type Trained = TrainedTrendAdjusted;

    fn train(&self, history: &[f64]) -> Result<Self::Trained> {
        let window = lookback_window(history, self.window)?;
        let fit = LinearFit::fit(window)?;

        Ok(TrainedTrendAdjusted {
            name: self.name.clone(),
            fit,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedTrendAdjusted {
    /// The fitted line
    pub fn fit(&self) -> &LinearFit {
        &self.fit
    }
}

impl TrainedForecastModel for TrainedTrendAdjusted {
    fn forecast(&self, horizon: usize) -> Result<MethodForecast> {
        check_horizon(horizon)?;

        let values = (1..=horizon).map(|ahead| self.fit.project(ahead)).collect();

        Ok(MethodForecast {
            method: ForecastMethod::TrendAdjusted,
            values,
            variance: self.fit.residual_variance,
        })
    }

    fn variance(&self) -> f64 {
        self.fit.residual_variance
    }

    fn name(&self) -> &str {
        &self.name
    }
}
