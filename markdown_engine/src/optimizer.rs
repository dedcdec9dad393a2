//! Markdown optimizer
//!
//! Decides, per SKU, whether the plan's target sell-through is reachable at
//! full price, through one of the scheduled phases, or only by clearing the
//! stock. SKUs are independent and evaluated in parallel; the result keeps the
//! input order.

use crate::error::{MarkdownError, Result};
use crate::plan::MarkdownPlan;
use crate::projection::Projection;
use crate::sku::{MarkdownSkuPlan, RecommendedAction, SkuSnapshot};
use crate::utils::{fractional_weeks, validate_non_negative, validate_positive, validate_range};
use chrono::{Duration, NaiveDate};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info, instrument};

/// Tunable heuristics of the optimizer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptimizerSettings {
    /// Sell-through rate multiplier gained per unit of markdown depth
    pub uplift_per_markdown_point: f64,
    /// Weeks of cover above this multiple of the remaining weeks is stale stock
    pub staleness_multiplier: f64,
    /// Below this share of the target after clearing, stock leaves the floor
    pub remove_from_floor_ratio: f64,
    /// Confidence base when the forecast has no back-tested accuracy
    pub unscored_confidence: f64,
    /// Weeks of staleness that reduce confidence to zero when the demand does
    /// not carry the lookback of the forecast behind it
    pub recency_weeks: usize,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            uplift_per_markdown_point: 2.0,
            staleness_multiplier: 2.0,
            remove_from_floor_ratio: 0.5,
            unscored_confidence: 0.5,
            recency_weeks: 8,
        }
    }
}

impl OptimizerSettings {
    /// Check every setting is within range
    pub fn validate(&self) -> Result<()> {
        validate_non_negative(self.uplift_per_markdown_point, "uplift_per_markdown_point")
            .map_err(MarkdownError::InvalidConfig)?;
        validate_positive(self.staleness_multiplier, "staleness_multiplier")
            .map_err(MarkdownError::InvalidConfig)?;
        validate_range(self.remove_from_floor_ratio, 0.0, 1.0, "remove_from_floor_ratio")
            .map_err(MarkdownError::InvalidConfig)?;
        validate_range(self.unscored_confidence, 0.0, 1.0, "unscored_confidence")
            .map_err(MarkdownError::InvalidConfig)?;
        if self.recency_weeks == 0 {
            return Err(MarkdownError::InvalidConfig(
                "recency_weeks must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Aggregate view over all recommendations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationSummary {
    pub counts_by_action: BTreeMap<RecommendedAction, usize>,
    /// Sum of predicted revenue over every SKU
    pub total_expected_revenue: f64,
    /// Mean confidence over every SKU; 0 when there are none
    pub avg_confidence: f64,
    /// SKUs returned unchanged because a human froze them
    pub overridden_skus: usize,
}

/// Output of one optimization pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub plan_name: String,
    pub as_of: NaiveDate,
    pub total_skus: usize,
    pub recommendations: Vec<MarkdownSkuPlan>,
    pub summary: OptimizationSummary,
}

impl OptimizationResult {
    /// Recommendation for one SKU
    pub fn recommendation(&self, sku_id: &str) -> Option<&MarkdownSkuPlan> {
        self.recommendations.iter().find(|r| r.sku_id == sku_id)
    }
}

struct Outcome {
    action: RecommendedAction,
    markdown_pct: f64,
    sell_through: f64,
}

/// Optimizer bound to one validated plan
#[derive(Debug, Clone)]
pub struct MarkdownOptimizer {
    plan: MarkdownPlan,
    settings: OptimizerSettings,
}

impl MarkdownOptimizer {
    /// Create an optimizer, rejecting out-of-range settings
    pub fn new(plan: MarkdownPlan, settings: OptimizerSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { plan, settings })
    }

    pub fn plan(&self) -> &MarkdownPlan {
        &self.plan
    }

    pub fn settings(&self) -> &OptimizerSettings {
        &self.settings
    }

    /// Projection from `as_of` to the end of the plan
    pub fn projection(&self, as_of: NaiveDate) -> Projection {
        Projection::new(
            fractional_weeks(as_of, self.plan.plan_end_date()),
            self.settings.uplift_per_markdown_point,
            self.plan.max_markdown_pct(),
        )
    }

    /// Check the evaluation date and every snapshot before computing anything
    pub fn validate_inputs(&self, as_of: NaiveDate, skus: &[SkuSnapshot]) -> Result<()> {
        if as_of >= self.plan.plan_end_date() {
            return Err(MarkdownError::InvalidInput(format!(
                "Plan '{}' ended on {}, cannot evaluate as of {}",
                self.plan.plan_name(),
                self.plan.plan_end_date(),
                as_of
            )));
        }

        let mut seen = HashSet::with_capacity(skus.len());
        for sku in skus {
            sku.validate()?;
            if !seen.insert(sku.sku_id.as_str()) {
                return Err(MarkdownError::InvalidInput(format!(
                    "Duplicate SKU '{}'",
                    sku.sku_id
                )));
            }
        }
        Ok(())
    }

    /// Recommend an action for every SKU as of a date
    #[instrument(skip_all, fields(plan = self.plan.plan_name(), skus = skus.len()))]
    pub fn optimize(&self, as_of: NaiveDate, skus: &[SkuSnapshot]) -> Result<OptimizationResult> {
        self.validate_inputs(as_of, skus)?;

        let projection = self.projection(as_of);
        let recommendations: Vec<MarkdownSkuPlan> = skus
            .par_iter()
            .map(|sku| match sku.frozen_plan() {
                Some(frozen) => frozen.clone(),
                None => self.evaluate(&projection, as_of, sku),
            })
            .collect();

        let summary = summarize(&recommendations);
        info!(
            revenue = summary.total_expected_revenue,
            overridden = summary.overridden_skus,
            "markdown optimization completed"
        );

        Ok(OptimizationResult {
            plan_name: self.plan.plan_name().to_string(),
            as_of,
            total_skus: recommendations.len(),
            recommendations,
            summary,
        })
    }

    /// Recommendation for a single, already validated SKU
    pub fn evaluate(
        &self,
        projection: &Projection,
        as_of: NaiveDate,
        sku: &SkuSnapshot,
    ) -> MarkdownSkuPlan {
        let stock = sku.current_stock;
        let mean_weekly = sku.demand.mean_weekly(as_of);

        let current_woc = if mean_weekly > 0.0 {
            Some(stock / mean_weekly)
        } else if stock > 0.0 {
            None
        } else {
            Some(0.0)
        };

        let outcome = self.decide(projection, as_of, sku, current_woc);
        let confidence_score = self.confidence(as_of, sku);
        let predicted_revenue =
            outcome.sell_through * stock * sku.unit_price * (1.0 - outcome.markdown_pct);

        debug!(
            sku = %sku.sku_id,
            action = %outcome.action,
            sell_through = outcome.sell_through,
            "evaluated sku"
        );

        MarkdownSkuPlan {
            sku_id: sku.sku_id.clone(),
            current_stock: stock,
            current_woc,
            current_sell_through: sku.current_sell_through,
            recommended_action: outcome.action,
            recommended_markdown_pct: outcome.markdown_pct,
            predicted_sell_through: outcome.sell_through,
            predicted_revenue,
            confidence_score,
            is_overridden: false,
        }
    }

    fn decide(
        &self,
        projection: &Projection,
        as_of: NaiveDate,
        sku: &SkuSnapshot,
        current_woc: Option<f64>,
    ) -> Outcome {
        let weekly = sku.demand.weekly_from(as_of);
        let stock = sku.current_stock;
        let target = self.plan.target_sell_through_pct();

        let baseline = projection.sell_through(weekly, stock, 0.0, 0.0);
        if baseline >= target {
            return Outcome {
                action: RecommendedAction::NoAction,
                markdown_pct: 0.0,
                sell_through: baseline,
            };
        }

        // Phases not yet over, in plan order; depths only grow along the way
        let mut deepest_remaining = None;
        for (position, phase) in self.plan.phases().iter().enumerate() {
            if phase.end_date <= as_of {
                continue;
            }
            let Some(action) = RecommendedAction::include_phase(position) else {
                continue;
            };

            let effective_from = fractional_weeks(as_of, phase.start_date.max(as_of));
            let sell_through =
                projection.sell_through(weekly, stock, phase.markdown_pct, effective_from);
            let outcome = Outcome {
                action,
                markdown_pct: phase.markdown_pct,
                sell_through,
            };

            if sell_through >= target {
                return outcome;
            }
            deepest_remaining = Some(outcome);
        }

        let stale = match current_woc {
            Some(woc) => woc > self.settings.staleness_multiplier * projection.weeks_remaining(),
            None => true,
        };

        match deepest_remaining {
            Some(best_effort) if !stale => best_effort,
            _ => {
                let max_pct = self.plan.max_markdown_pct();
                let sell_through = projection.sell_through(weekly, stock, max_pct, 0.0);
                let action = if sell_through < self.settings.remove_from_floor_ratio * target {
                    RecommendedAction::RemoveFromFloor
                } else {
                    RecommendedAction::ImmediateClear
                };
                Outcome {
                    action,
                    markdown_pct: max_pct,
                    sell_through,
                }
            }
        }
    }

    /// Forecast accuracy scaled down by how stale the underlying data is
    pub fn confidence(&self, as_of: NaiveDate, sku: &SkuSnapshot) -> f64 {
        let base = sku
            .demand
            .accuracy
            .unwrap_or(self.settings.unscored_confidence);

        let window = sku
            .demand
            .lookback_weeks
            .unwrap_or(self.settings.recency_weeks);

        // Staleness counts from the end of the last observed week
        let recency = match sku.demand.last_observed_week {
            Some(week) => {
                let staleness = fractional_weeks(week + Duration::weeks(1), as_of).max(0.0);
                (1.0 - staleness / window as f64).clamp(0.0, 1.0)
            }
            None => 1.0,
        };

        (base * recency).clamp(0.0, 1.0)
    }
}

fn summarize(recommendations: &[MarkdownSkuPlan]) -> OptimizationSummary {
    let mut counts_by_action = BTreeMap::new();
    let mut total_expected_revenue = 0.0;
    let mut total_confidence = 0.0;
    let mut overridden_skus = 0;

    for rec in recommendations {
        *counts_by_action.entry(rec.recommended_action).or_insert(0) += 1;
        total_expected_revenue += rec.predicted_revenue;
        total_confidence += rec.confidence_score;
        if rec.is_overridden {
            overridden_skus += 1;
        }
    }

    let avg_confidence = if recommendations.is_empty() {
        0.0
    } else {
        total_confidence / recommendations.len() as f64
    };

    OptimizationSummary {
        counts_by_action,
        total_expected_revenue,
        avg_confidence,
        overridden_skus,
    }
}
