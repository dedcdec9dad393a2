//! Utility functions for the demand_forecast crate

use crate::data::{Observation, WeeklySeries};
use crate::error::{ForecastError, Result};
use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

/// Start dates of the `horizon` weeks following `last_week`
pub fn future_weeks(last_week: NaiveDate, horizon: usize) -> Vec<NaiveDate> {
    (1..=horizon)
        .map(|i| last_week + Duration::weeks(i as i64))
        .collect()
}

/// Whole weeks from `from` to `to`, negative when `to` is earlier
pub fn weeks_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days().div_euclid(7)
}

/// Build a consecutive weekly series from a list of unit sales.
///
/// Stock on hand is recorded as zero; only the sales column matters for
/// forecasting.
pub fn series_from_units(
    entity_id: &str,
    first_week: NaiveDate,
    units: &[f64],
) -> Result<WeeklySeries> {
    let observations = units
        .iter()
        .enumerate()
        .map(|(i, &units_sold)| Observation {
            entity_id: entity_id.to_string(),
            week: first_week + Duration::weeks(i as i64),
            units_sold,
            stock_on_hand: 0.0,
        })
        .collect();

    WeeklySeries::new(entity_id, observations)
}

/// Generate synthetic weekly demand for testing and demos.
///
/// Demand starts at `base` units, drifts by `weekly_growth` units per week and
/// carries normal noise with standard deviation `noise`. Values are floored at
/// zero. The same seed always yields the same history.
pub fn generate_weekly_history(
    weeks: usize,
    base: f64,
    weekly_growth: f64,
    noise: f64,
    seed: u64,
) -> Result<Vec<f64>> {
    let normal = Normal::new(0.0, noise)
        .map_err(|e| ForecastError::InvalidData(format!("Invalid noise level: {}", e)))?;
    let mut rng = StdRng::seed_from_u64(seed);

    Ok((0..weeks)
        .map(|w| {
            let level = base + weekly_growth * w as f64;
            (level + normal.sample(&mut rng)).max(0.0)
        })
        .collect())
}
