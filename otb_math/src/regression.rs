//! Ordinary least squares trend fitting
//!
//! Fits `y = intercept + slope * x` where `x` is the position of each value
//! in the series (`0..n`). This is the trend model behind trend-adjusted
//! demand forecasts and consumption-rate acceleration checks.

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// A fitted linear trend over an evenly spaced series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    /// Change in value per period
    pub slope: f64,
    /// Fitted value at position 0
    pub intercept: f64,
    /// Residual variance, SSR / (n - 2); zero when n <= 2
    pub residual_variance: f64,
    /// Number of points the fit was computed from
    pub n: usize,
}

impl LinearFit {
    /// Fit a least-squares line to the values
    ///
    /// A single value is treated as a flat line through that value.
    pub fn fit(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(MathError::InsufficientData(
                "Need at least 1 point for a linear fit".to_string(),
            ));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(MathError::InvalidInput(
                "Linear fit requires finite values".to_string(),
            ));
        }

        let n = values.len();
        if n == 1 {
            return Ok(Self {
                slope: 0.0,
                intercept: values[0],
                residual_variance: 0.0,
                n,
            });
        }

        let nf = n as f64;
        let x_mean = (nf - 1.0) / 2.0;
        let y_mean = values.iter().sum::<f64>() / nf;

        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for (i, &y) in values.iter().enumerate() {
            let dx = i as f64 - x_mean;
            numerator += dx * (y - y_mean);
            denominator += dx * dx;
        }

        if denominator.abs() < 1e-12 {
            return Err(MathError::CalculationError(
                "Cannot calculate slope: x values are too similar".to_string(),
            ));
        }

        let slope = numerator / denominator;
        let intercept = y_mean - slope * x_mean;

        let ss_residual: f64 = values
            .iter()
            .enumerate()
            .map(|(i, &y)| (y - (intercept + slope * i as f64)).powi(2))
            .sum();

        let residual_variance = if n > 2 {
            ss_residual / (nf - 2.0)
        } else {
            0.0
        };

        Ok(Self {
            slope,
            intercept,
            residual_variance,
            n,
        })
    }

    /// Value of the fitted line at position `x`
    pub fn value_at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// Projected value `periods_ahead` steps after the last fitted point (1 = next period)
    pub fn project(&self, periods_ahead: usize) -> f64 {
        self.value_at((self.n - 1 + periods_ahead) as f64)
    }
}
