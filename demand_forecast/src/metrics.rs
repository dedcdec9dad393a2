//! Metrics for evaluating forecast performance

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};

/// Back-tested forecast accuracy
///
/// `mape` and `accuracy` are `None` when no held-out week had positive
/// demand, since a percentage error against zero is undefined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccuracyMetrics {
    /// Mean Absolute Error
    pub mae: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error as a fraction (0.1 = 10%)
    pub mape: Option<f64>,
    /// `1 - mape`, clamped to [0, 1]
    pub accuracy: Option<f64>,
    /// Number of held-out weeks compared
    pub evaluated_weeks: usize,
}

impl AccuracyMetrics {
    /// Compare predicted values with what actually sold
    pub fn evaluate(predicted: &[f64], actual: &[f64]) -> Result<Self> {
        if predicted.len() != actual.len() || predicted.is_empty() {
            return Err(ForecastError::InvalidData(
                "Forecast and actual values must have the same non-zero length".to_string(),
            ));
        }

        let n = predicted.len() as f64;

        // Calculate errors
        let errors: Vec<f64> = predicted
            .iter()
            .zip(actual.iter())
            .map(|(&p, &a)| a - p)
            .collect();

        let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
        let rmse = (errors.iter().map(|e| e.powi(2)).sum::<f64>() / n).sqrt();

        // Only weeks with positive actual demand contribute to MAPE
        let percentage_errors: Vec<f64> = actual
            .iter()
            .zip(errors.iter())
            .filter(|(&a, _)| a > 0.0)
            .map(|(&a, &e)| e.abs() / a)
            .collect();

        let mape = if percentage_errors.is_empty() {
            None
        } else {
            Some(percentage_errors.iter().sum::<f64>() / percentage_errors.len() as f64)
        };
        let accuracy = mape.map(|m| (1.0 - m).clamp(0.0, 1.0));

        Ok(Self {
            mae,
            rmse,
            mape,
            accuracy,
            evaluated_weeks: predicted.len(),
        })
    }
}

impl std::fmt::Display for AccuracyMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Forecast Accuracy Metrics ({} weeks):", self.evaluated_weeks)?;
        writeln!(f, "  MAE:      {:.4}", self.mae)?;
        writeln!(f, "  RMSE:     {:.4}", self.rmse)?;
        match self.mape {
            Some(mape) => writeln!(f, "  MAPE:     {:.2}%", mape * 100.0)?,
            None => writeln!(f, "  MAPE:     n/a")?,
        }
        match self.accuracy {
            Some(accuracy) => writeln!(f, "  Accuracy: {:.2}%", accuracy * 100.0)?,
            None => writeln!(f, "  Accuracy: n/a")?,
        }
        Ok(())
    }
}
