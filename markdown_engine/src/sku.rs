//! Per-SKU inputs and recommendations

use crate::error::{MarkdownError, Result};
use crate::plan::MarkdownPlan;
use crate::utils::{validate_non_negative, validate_range};
use chrono::{Duration, NaiveDate};
use demand_forecast::utils::weeks_between;
use demand_forecast::{
    EnsembleCombiner, ForecastConfig, ForecastRun, InsightThresholds, RunStatus, WeeklySeries,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Markdown decision for one SKU
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendedAction {
    NoAction,
    IncludePhase1,
    IncludePhase2,
    IncludePhase3,
    ImmediateClear,
    RemoveFromFloor,
}

impl RecommendedAction {
    /// Action for the phase at `position` (0-based) in the plan
    pub fn include_phase(position: usize) -> Option<Self> {
        match position {
            0 => Some(RecommendedAction::IncludePhase1),
            1 => Some(RecommendedAction::IncludePhase2),
            2 => Some(RecommendedAction::IncludePhase3),
            _ => None,
        }
    }

    /// Position of the phase this action schedules, if it schedules one
    pub fn phase_position(self) -> Option<usize> {
        match self {
            RecommendedAction::IncludePhase1 => Some(0),
            RecommendedAction::IncludePhase2 => Some(1),
            RecommendedAction::IncludePhase3 => Some(2),
            RecommendedAction::NoAction
            | RecommendedAction::ImmediateClear
            | RecommendedAction::RemoveFromFloor => None,
        }
    }
}

impl fmt::Display for RecommendedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RecommendedAction::NoAction => "NO_ACTION",
            RecommendedAction::IncludePhase1 => "INCLUDE_PHASE_1",
            RecommendedAction::IncludePhase2 => "INCLUDE_PHASE_2",
            RecommendedAction::IncludePhase3 => "INCLUDE_PHASE_3",
            RecommendedAction::ImmediateClear => "IMMEDIATE_CLEAR",
            RecommendedAction::RemoveFromFloor => "REMOVE_FROM_FLOOR",
        };
        f.write_str(label)
    }
}

/// Forecast inputs the optimizer needs for one SKU
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkuDemand {
    /// Forecasted units per week, starting the week after `last_observed_week`
    pub weekly_forecast: Vec<f64>,
    /// Back-tested forecast accuracy in [0, 1]
    #[serde(default)]
    pub accuracy: Option<f64>,
    /// Week of the most recent observation behind the forecast
    #[serde(default)]
    pub last_observed_week: Option<NaiveDate>,
    /// Lookback window of the forecast configuration, in weeks
    #[serde(default)]
    pub lookback_weeks: Option<usize>,
}

impl SkuDemand {
    /// Take the forecast from a completed run
    pub fn from_run(run: &ForecastRun) -> Result<Self> {
        if run.status() != RunStatus::Completed {
            return Err(MarkdownError::InvalidInput(format!(
                "Forecast run for '{}' is {:?}, not completed",
                run.entity_id(),
                run.status()
            )));
        }

        Ok(Self {
            weekly_forecast: run.weekly_forecast().to_vec(),
            accuracy: run.accuracy(),
            last_observed_week: run.last_observed_week(),
            lookback_weeks: Some(run.lookback_weeks()),
        })
    }

    /// Forecast a SKU's history directly
    pub fn from_series(
        config: &ForecastConfig,
        series: &WeeklySeries,
        thresholds: InsightThresholds,
    ) -> Result<Self> {
        let forecast = EnsembleCombiner::new(config)
            .with_thresholds(thresholds)
            .forecast(&series.units_sold())?;

        Ok(Self {
            weekly_forecast: forecast.weekly_forecast,
            accuracy: forecast.accuracy.and_then(|m| m.accuracy),
            last_observed_week: series.last_week(),
            lookback_weeks: Some(config.lookback_weeks()),
        })
    }

    /// Forecast weeks starting at `as_of`.
    ///
    /// Weeks between the last observation and `as_of` are already past and
    /// dropped. Once the whole horizon has passed, the final week stands in
    /// for everything after it.
    pub fn weekly_from(&self, as_of: NaiveDate) -> &[f64] {
        let elapsed = self
            .last_observed_week
            .map(|week| weeks_between(week + Duration::weeks(1), as_of).max(0) as usize)
            .unwrap_or(0);
        let last = self.weekly_forecast.len().saturating_sub(1);
        &self.weekly_forecast[elapsed.min(last)..]
    }

    /// Mean weekly demand from `as_of` onward
    pub fn mean_weekly(&self, as_of: NaiveDate) -> f64 {
        let weekly = self.weekly_from(as_of);
        if weekly.is_empty() {
            return 0.0;
        }
        weekly.iter().sum::<f64>() / weekly.len() as f64
    }
}

/// Current state of one SKU as seen by the optimizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkuSnapshot {
    pub sku_id: String,
    pub current_stock: f64,
    /// Share of the initial buy already sold, in [0, 1]
    pub current_sell_through: f64,
    /// Full (unmarked) selling price
    pub unit_price: f64,
    pub demand: SkuDemand,
    /// Recommendation from the previous optimization, if any
    #[serde(default)]
    pub prior_plan: Option<MarkdownSkuPlan>,
}

impl SkuSnapshot {
    /// Check quantities and forecast before any computation
    pub fn validate(&self) -> Result<()> {
        if self.sku_id.trim().is_empty() {
            return Err(MarkdownError::InvalidInput(
                "sku_id must not be empty".to_string(),
            ));
        }

        let context = |e: String| MarkdownError::InvalidInput(format!("{}: {}", self.sku_id, e));
        validate_non_negative(self.current_stock, "current_stock").map_err(context)?;
        validate_non_negative(self.unit_price, "unit_price").map_err(context)?;
        validate_range(self.current_sell_through, 0.0, 1.0, "current_sell_through")
            .map_err(context)?;

        if self.demand.weekly_forecast.is_empty() {
            return Err(MarkdownError::InvalidInput(format!(
                "{}: weekly_forecast is empty",
                self.sku_id
            )));
        }
        for value in &self.demand.weekly_forecast {
            validate_non_negative(*value, "weekly_forecast").map_err(context)?;
        }
        if self.demand.lookback_weeks == Some(0) {
            return Err(MarkdownError::InvalidInput(format!(
                "{}: lookback_weeks must be at least 1",
                self.sku_id
            )));
        }
        if let Some(accuracy) = self.demand.accuracy {
            validate_range(accuracy, 0.0, 1.0, "accuracy").map_err(context)?;
        }
        if let Some(prior) = &self.prior_plan {
            if prior.sku_id != self.sku_id {
                return Err(MarkdownError::InvalidInput(format!(
                    "{}: prior plan belongs to '{}'",
                    self.sku_id, prior.sku_id
                )));
            }
        }

        Ok(())
    }

    /// Prior plan that a human has frozen
    pub fn frozen_plan(&self) -> Option<&MarkdownSkuPlan> {
        self.prior_plan.as_ref().filter(|p| p.is_overridden)
    }
}

/// Markdown recommendation for one SKU
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkdownSkuPlan {
    pub sku_id: String,
    pub current_stock: f64,
    /// Weeks of cover; `None` when stock exists but no demand is forecast
    pub current_woc: Option<f64>,
    pub current_sell_through: f64,
    pub recommended_action: RecommendedAction,
    pub recommended_markdown_pct: f64,
    pub predicted_sell_through: f64,
    pub predicted_revenue: f64,
    pub confidence_score: f64,
    pub is_overridden: bool,
}

impl MarkdownSkuPlan {
    /// Replace the computed action with a human decision.
    ///
    /// The plan is frozen afterwards: later optimizations return it unchanged.
    /// Predictions keep describing the computed recommendation.
    pub fn apply_override(
        &mut self,
        plan: &MarkdownPlan,
        action: RecommendedAction,
        markdown_pct: f64,
    ) -> Result<()> {
        validate_range(markdown_pct, 0.0, plan.max_markdown_pct(), "Override markdown_pct")
            .map_err(MarkdownError::InvalidInput)?;

        if let Some(position) = action.phase_position() {
            if position >= plan.phases().len() {
                return Err(MarkdownError::InvalidInput(format!(
                    "{} refers to a phase the plan does not have",
                    action
                )));
            }
        }

        self.recommended_action = action;
        self.recommended_markdown_pct = markdown_pct;
        self.is_overridden = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{MarkdownPhase, MarkdownPlanSpec, PlanScope, PlanStatus, PlanType};

    fn plan() -> MarkdownPlan {
        MarkdownPlan::new(MarkdownPlanSpec {
            plan_name: "Test".to_string(),
            plan_type: PlanType::Seasonal,
            status: PlanStatus::Draft,
            scope: PlanScope {
                season_id: "AW24".to_string(),
                brand_id: "ACME".to_string(),
                category_id: Some("KNIT".to_string()),
            },
            plan_start_date: "2024-09-02".parse().unwrap(),
            plan_end_date: "2024-10-28".parse().unwrap(),
            target_sell_through_pct: 0.7,
            max_markdown_pct: 0.4,
            phases: vec![MarkdownPhase {
                phase_order: 1,
                name: "First".to_string(),
                start_date: "2024-09-02".parse().unwrap(),
                end_date: "2024-09-30".parse().unwrap(),
                markdown_pct: 0.2,
            }],
        })
        .unwrap()
    }

    fn sku_plan() -> MarkdownSkuPlan {
        MarkdownSkuPlan {
            sku_id: "SKU-1".to_string(),
            current_stock: 100.0,
            current_woc: Some(10.0),
            current_sell_through: 0.3,
            recommended_action: RecommendedAction::NoAction,
            recommended_markdown_pct: 0.0,
            predicted_sell_through: 0.8,
            predicted_revenue: 800.0,
            confidence_score: 0.9,
            is_overridden: false,
        }
    }

    #[test]
    fn test_override_validates_ceiling() {
        let plan = plan();
        let mut sku = sku_plan();

        assert!(sku
            .apply_override(&plan, RecommendedAction::ImmediateClear, 0.5)
            .is_err());
        assert!(!sku.is_overridden);

        sku.apply_override(&plan, RecommendedAction::ImmediateClear, 0.4)
            .unwrap();
        assert!(sku.is_overridden);
        assert_eq!(sku.recommended_action, RecommendedAction::ImmediateClear);
    }

    #[test]
    fn test_override_rejects_missing_phase() {
        let mut sku = sku_plan();
        assert!(sku
            .apply_override(&plan(), RecommendedAction::IncludePhase2, 0.2)
            .is_err());
    }

    #[test]
    fn test_action_phase_mapping() {
        for position in 0..3 {
            let action = RecommendedAction::include_phase(position).unwrap();
            assert_eq!(action.phase_position(), Some(position));
        }
        assert_eq!(RecommendedAction::include_phase(3), None);
        for action in [
            RecommendedAction::NoAction,
            RecommendedAction::ImmediateClear,
            RecommendedAction::RemoveFromFloor,
        ] {
            assert_eq!(action.phase_position(), None);
        }
        assert_eq!(RecommendedAction::IncludePhase2.to_string(), "INCLUDE_PHASE_2");
    }

    #[test]
    fn test_snapshot_validation() {
        let mut snapshot = SkuSnapshot {
            sku_id: "SKU-1".to_string(),
            current_stock: 10.0,
            current_sell_through: 0.2,
            unit_price: 20.0,
            demand: SkuDemand {
                weekly_forecast: vec![1.0, 2.0],
                accuracy: Some(0.9),
                last_observed_week: None,
                lookback_weeks: None,
            },
            prior_plan: None,
        };
        assert!(snapshot.validate().is_ok());
        assert_eq!(snapshot.demand.mean_weekly("2024-01-01".parse().unwrap()), 1.5);

        snapshot.demand.lookback_weeks = Some(0);
        assert!(snapshot.validate().is_err());
        snapshot.demand.lookback_weeks = Some(4);

        snapshot.demand.weekly_forecast.clear();
        assert!(snapshot.validate().is_err());
    }

    #[test]
    fn test_forecast_aligned_to_evaluation_date() {
        let demand = SkuDemand {
            weekly_forecast: vec![90.0, 100.0, 110.0, 120.0],
            accuracy: None,
            last_observed_week: Some("2024-02-05".parse().unwrap()),
            lookback_weeks: Some(8),
        };
        let date = |s: &str| s.parse::<NaiveDate>().unwrap();

        // First forecast week starts 2024-02-12
        assert_eq!(demand.weekly_from(date("2024-02-12")), &[90.0, 100.0, 110.0, 120.0]);
        assert_eq!(demand.weekly_from(date("2024-02-01")), &[90.0, 100.0, 110.0, 120.0]);
        assert_eq!(demand.weekly_from(date("2024-02-28")), &[110.0, 120.0]);
        assert_eq!(demand.weekly_from(date("2024-03-04")), &[120.0]);
        assert_eq!(demand.weekly_from(date("2024-05-06")), &[120.0]);
        assert_eq!(demand.mean_weekly(date("2024-02-26")), 115.0);
    }
}
