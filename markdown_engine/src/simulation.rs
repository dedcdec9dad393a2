//! What-if simulation of alternate markdown depths
//!
//! A scenario replays the optimizer's projection with some SKUs forced to a
//! chosen depth from the evaluation date. Nothing is stored and no clock is
//! read, so identical inputs give identical (and identically serialized)
//! results.

use crate::error::{MarkdownError, Result};
use crate::optimizer::MarkdownOptimizer;
use crate::sku::SkuSnapshot;
use crate::utils::validate_range;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Forced markdown depth for a set of SKUs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioAdjustment {
    /// SKUs affected; empty means every SKU
    #[serde(default)]
    pub sku_ids: Vec<String>,
    pub markdown_pct: f64,
}

impl ScenarioAdjustment {
    fn applies_to(&self, sku_id: &str) -> bool {
        self.sku_ids.is_empty() || self.sku_ids.iter().any(|id| id == sku_id)
    }
}

/// Named set of adjustments; later adjustments win
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub adjustments: Vec<ScenarioAdjustment>,
}

impl Scenario {
    /// Scenario that changes nothing
    pub fn baseline(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            adjustments: Vec::new(),
        }
    }

    /// Depth forced on a SKU by this scenario, if any
    pub fn markdown_for(&self, sku_id: &str) -> Option<f64> {
        self.adjustments
            .iter()
            .rev()
            .find(|adj| adj.applies_to(sku_id))
            .map(|adj| adj.markdown_pct)
    }
}

/// Aggregate outcome of a scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub scenario_name: String,
    pub total_revenue: f64,
    pub total_units: f64,
    pub avg_sell_through: f64,
    pub sku_count: usize,
}

/// Difference of a scenario against a baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioComparison {
    pub baseline_name: String,
    pub scenario_name: String,
    pub revenue_delta: f64,
    pub units_delta: f64,
    pub sell_through_delta: f64,
}

/// Deltas of `scenario` relative to `baseline`
pub fn compare(baseline: &SimulationResult, scenario: &SimulationResult) -> ScenarioComparison {
    ScenarioComparison {
        baseline_name: baseline.scenario_name.clone(),
        scenario_name: scenario.scenario_name.clone(),
        revenue_delta: scenario.total_revenue - baseline.total_revenue,
        units_delta: scenario.total_units - baseline.total_units,
        sell_through_delta: scenario.avg_sell_through - baseline.avg_sell_through,
    }
}

/// Runs scenarios against an optimizer's plan and settings
#[derive(Debug, Clone, Copy)]
pub struct SimulationRunner<'a> {
    optimizer: &'a MarkdownOptimizer,
}

impl<'a> SimulationRunner<'a> {
    pub fn new(optimizer: &'a MarkdownOptimizer) -> Self {
        Self { optimizer }
    }

    /// Project a scenario over the SKUs as of a date.
    ///
    /// SKUs the scenario does not touch keep the optimizer's recommendation;
    /// frozen SKUs keep their frozen plan even when a scenario targets them.
    #[instrument(skip_all, fields(scenario = %scenario.name, skus = skus.len()))]
    pub fn simulate(
        &self,
        as_of: NaiveDate,
        skus: &[SkuSnapshot],
        scenario: &Scenario,
    ) -> Result<SimulationResult> {
        let max_pct = self.optimizer.plan().max_markdown_pct();
        for adjustment in &scenario.adjustments {
            validate_range(adjustment.markdown_pct, 0.0, max_pct, "Scenario markdown_pct")
                .map_err(|e| {
                    MarkdownError::InvalidInput(format!("Scenario '{}': {}", scenario.name, e))
                })?;
        }

        let optimized = self.optimizer.optimize(as_of, skus)?;
        let projection = self.optimizer.projection(as_of);

        let mut total_revenue = 0.0;
        let mut total_units = 0.0;
        let mut total_sell_through = 0.0;

        for (sku, rec) in skus.iter().zip(optimized.recommendations.iter()) {
            let forced = if rec.is_overridden {
                None
            } else {
                scenario.markdown_for(&sku.sku_id)
            };

            let (sell_through, revenue) = match forced {
                Some(pct) => {
                    let sell_through = projection.sell_through(
                        sku.demand.weekly_from(as_of),
                        sku.current_stock,
                        pct,
                        0.0,
                    );
                    let revenue = sell_through * sku.current_stock * sku.unit_price * (1.0 - pct);
                    (sell_through, revenue)
                }
                None => (rec.predicted_sell_through, rec.predicted_revenue),
            };

            total_revenue += revenue;
            total_units += sell_through * rec.current_stock;
            total_sell_through += sell_through;
        }

        let sku_count = optimized.recommendations.len();
        let avg_sell_through = if sku_count == 0 {
            0.0
        } else {
            total_sell_through / sku_count as f64
        };

        debug!(revenue = total_revenue, units = total_units, "scenario simulated");

        Ok(SimulationResult {
            scenario_name: scenario.name.clone(),
            total_revenue,
            total_units,
            avg_sell_through,
            sku_count,
        })
    }
}
