//! Descriptive statistics over plain `f64` slices

use crate::{MathError, Result};

fn ensure_finite(values: &[f64]) -> Result<()> {
    if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
        return Err(MathError::InvalidInput(format!(
            "Non-finite value at position {}",
            pos
        )));
    }
    Ok(())
}

/// Arithmetic mean of the values
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot take the mean of an empty series".to_string(),
        ));
    }
    ensure_finite(values)?;

    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample variance (n-1 denominator)
///
/// A single observation carries no spread information and yields `0.0`.
pub fn sample_variance(values: &[f64]) -> Result<f64> {
    let avg = mean(values)?;
    if values.len() < 2 {
        return Ok(0.0);
    }

    let ss = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>();
    Ok(ss / (values.len() - 1) as f64)
}

/// Mean of squared values, used for residual-based variance estimates
pub fn mean_squared(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot take the mean square of an empty series".to_string(),
        ));
    }
    ensure_finite(values)?;

    Ok(values.iter().map(|v| v * v).sum::<f64>() / values.len() as f64)
}

/// Standard deviation relative to the mean.
///
/// Returns `None` when the mean is zero, since the ratio is undefined.
pub fn coefficient_of_variation(values: &[f64]) -> Result<Option<f64>> {
    let avg = mean(values)?;
    if avg.abs() < f64::EPSILON {
        return Ok(None);
    }
    let sd = sample_variance(values)?.sqrt();
    Ok(Some(sd / avg.abs()))
}
