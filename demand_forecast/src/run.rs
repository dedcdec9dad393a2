//! Forecast run records
//!
//! A [`ForecastRun`] moves `Pending -> Running -> Completed | Failed` and is
//! frozen once it reaches a terminal state. Re-forecasting always produces a
//! new run.

use crate::config::{ForecastConfig, ForecastMethod, ForecastScope, InsightThresholds};
use crate::data::WeeklySeries;
use crate::ensemble::{ConfidenceBound, EnsembleCombiner, EnsembleForecast};
use crate::error::{ForecastError, Result};
use crate::insights::ForecastInsight;
use crate::utils::future_weeks;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

/// Lifecycle state of a forecast run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    /// Completed and failed runs never change again
    pub fn is_terminal(self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Failed)
    }

    /// Whether `self -> next` is a legal step
    pub fn can_transition_to(self, next: RunStatus) -> bool {
        matches!(
            (self, next),
            (RunStatus::Pending, RunStatus::Running)
                | (RunStatus::Running, RunStatus::Completed)
                | (RunStatus::Running, RunStatus::Failed)
        )
    }
}

/// Materialized execution of one forecast configuration over one scope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRun {
    config_name: String,
    scope: ForecastScope,
    entity_id: String,
    method: ForecastMethod,
    lookback_weeks: usize,
    status: RunStatus,
    weekly_forecast: Vec<f64>,
    forecast_dates: Vec<NaiveDate>,
    confidence_band: Vec<ConfidenceBound>,
    accuracy: Option<f64>,
    mape: Option<f64>,
    rmse: Option<f64>,
    insights: Vec<ForecastInsight>,
    last_observed_week: Option<NaiveDate>,
    failure_reason: Option<String>,
    created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

impl ForecastRun {
    /// Create a pending run for a configuration and entity
    pub fn pending(config: &ForecastConfig, entity_id: impl Into<String>) -> Self {
        Self {
            config_name: config.name().to_string(),
            scope: config.scope().clone(),
            entity_id: entity_id.into(),
            method: config.primary_method(),
            lookback_weeks: config.lookback_weeks(),
            status: RunStatus::Pending,
            weekly_forecast: Vec::new(),
            forecast_dates: Vec::new(),
            confidence_band: Vec::new(),
            accuracy: None,
            mape: None,
            rmse: None,
            insights: Vec::new(),
            last_observed_week: None,
            failure_reason: None,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
        }
    }

    fn transition(&mut self, next: RunStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(ForecastError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    /// Mark the run as started
    pub fn start(&mut self) -> Result<()> {
        self.transition(RunStatus::Running)?;
        self.started_at = Some(Utc::now());
        Ok(())
    }

    /// Store the forecast and mark the run completed
    pub fn complete(
        &mut self,
        forecast: EnsembleForecast,
        last_observed_week: Option<NaiveDate>,
    ) -> Result<()> {
        self.transition(RunStatus::Completed)?;

        self.forecast_dates = last_observed_week
            .map(|week| future_weeks(week, forecast.weekly_forecast.len()))
            .unwrap_or_default();
        self.weekly_forecast = forecast.weekly_forecast;
        self.confidence_band = forecast.confidence_band;
        self.accuracy = forecast.accuracy.and_then(|m| m.accuracy);
        self.mape = forecast.accuracy.and_then(|m| m.mape);
        self.rmse = forecast.accuracy.map(|m| m.rmse);
        self.insights = forecast.insights;
        self.last_observed_week = last_observed_week;
        self.finished_at = Some(Utc::now());
        Ok(())
    }

    /// Record the failure reason and mark the run failed
    pub fn fail(&mut self, reason: &ForecastError) -> Result<()> {
        self.transition(RunStatus::Failed)?;
        self.failure_reason = Some(reason.to_string());
        self.finished_at = Some(Utc::now());
        Ok(())
    }

    pub fn config_name(&self) -> &str {
        &self.config_name
    }

    pub fn scope(&self) -> &ForecastScope {
        &self.scope
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    pub fn method(&self) -> ForecastMethod {
        self.method
    }

    /// Weeks of history the configuration looked at
    pub fn lookback_weeks(&self) -> usize {
        self.lookback_weeks
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    /// Forecasted units per future week; empty unless completed
    pub fn weekly_forecast(&self) -> &[f64] {
        &self.weekly_forecast
    }

    /// Start date of each forecasted week
    pub fn forecast_dates(&self) -> &[NaiveDate] {
        &self.forecast_dates
    }

    pub fn confidence_band(&self) -> &[ConfidenceBound] {
        &self.confidence_band
    }

    /// Back-tested accuracy in [0, 1]; absent without held-out history
    pub fn accuracy(&self) -> Option<f64> {
        self.accuracy
    }

    pub fn mape(&self) -> Option<f64> {
        self.mape
    }

    pub fn rmse(&self) -> Option<f64> {
        self.rmse
    }

    pub fn insights(&self) -> &[ForecastInsight] {
        &self.insights
    }

    /// Week of the most recent observation the forecast was built from
    pub fn last_observed_week(&self) -> Option<NaiveDate> {
        self.last_observed_week
    }

    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }
}

/// A fresh run always accepts start and then one terminal step
fn check_transition(step: &'static str, outcome: Result<()>) {
    if let Err(err) = &outcome {
        error!(step, error = %err, "forecast run rejected a lifecycle step");
    }
    debug_assert!(outcome.is_ok(), "{} rejected: {:?}", step, outcome);
}

/// Run a forecast for one entity's history.
///
/// Computation errors (for example too little history) do not escape: they
/// leave the returned run in `Failed` with the reason recorded, and no
/// partial forecast.
#[instrument(skip_all, fields(config = config.name(), entity = series.entity_id()))]
pub fn execute(
    config: &ForecastConfig,
    series: &WeeklySeries,
    thresholds: &InsightThresholds,
) -> ForecastRun {
    let mut run = ForecastRun::pending(config, series.entity_id());
    check_transition("start", run.start());

    let outcome = EnsembleCombiner::new(config)
        .with_thresholds(*thresholds)
        .forecast(&series.units_sold());

    match outcome {
        Ok(forecast) => {
            check_transition("complete", run.complete(forecast, series.last_week()));
            info!(
                weeks = run.weekly_forecast().len(),
                accuracy = ?run.accuracy(),
                "forecast completed"
            );
        }
        Err(err) => {
            warn!(error = %err, "forecast failed");
            check_transition("fail", run.fail(&err));
        }
    }

    run
}
