//! Single entry point over forecasting, markdown and replenishment

use crate::config::EngineConfig;
use crate::error::Result;
use chrono::NaiveDate;
use demand_forecast::{execute, ForecastConfig, ForecastRun, ObservationSource};
use markdown_engine::{
    compare, MarkdownOptimizer, MarkdownPlan, OptimizationResult, Scenario, ScenarioComparison,
    SimulationResult, SimulationRunner, SkuSnapshot,
};
use replenishment::{CategorySnapshot, MonitorReport, ReplenishmentMonitor};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// Baseline plus every scenario and its comparison against the baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhatIfReport {
    pub baseline: SimulationResult,
    pub scenarios: Vec<SimulationResult>,
    pub comparisons: Vec<ScenarioComparison>,
}

#[derive(Debug, Clone)]
pub struct InventoryDecisionEngine {
    config: EngineConfig,
    monitor: ReplenishmentMonitor,
}

impl InventoryDecisionEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let monitor = ReplenishmentMonitor::new(config.replenishment)?;
        Ok(Self { config, monitor })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Forecast every requested entity from an observation source.
    ///
    /// Failing to read an entity's history aborts the batch; a model failure
    /// only fails that entity's run.
    #[instrument(skip_all, fields(config = config.name(), entities = entity_ids.len()))]
    pub fn forecast<S, E>(
        &self,
        config: &ForecastConfig,
        source: &S,
        entity_ids: &[E],
    ) -> Result<Vec<ForecastRun>>
    where
        S: ObservationSource + ?Sized,
        E: AsRef<str>,
    {
        let mut runs = Vec::with_capacity(entity_ids.len());
        for entity_id in entity_ids {
            let series = source.weekly_series(entity_id.as_ref())?;
            runs.push(execute(config, &series, &self.config.forecast.insights));
        }

        info!(runs = runs.len(), "forecast batch finished");
        Ok(runs)
    }

    /// Recommend a markdown action for every SKU under a plan
    pub fn optimize(
        &self,
        plan: &MarkdownPlan,
        as_of: NaiveDate,
        skus: &[SkuSnapshot],
    ) -> Result<OptimizationResult> {
        let optimizer = MarkdownOptimizer::new(plan.clone(), self.config.markdown)?;
        Ok(optimizer.optimize(as_of, skus)?)
    }

    /// Months-of-cover status and alerts for every category
    pub fn monitor(&self, snapshots: &[CategorySnapshot]) -> Result<MonitorReport> {
        Ok(self.monitor.evaluate(snapshots)?)
    }

    /// Project one what-if scenario under a plan
    pub fn simulate(
        &self,
        plan: &MarkdownPlan,
        as_of: NaiveDate,
        skus: &[SkuSnapshot],
        scenario: &Scenario,
    ) -> Result<SimulationResult> {
        let optimizer = MarkdownOptimizer::new(plan.clone(), self.config.markdown)?;
        Ok(SimulationRunner::new(&optimizer).simulate(as_of, skus, scenario)?)
    }

    /// Run a baseline and each scenario, comparing every scenario to the baseline
    #[instrument(skip_all, fields(plan = plan.plan_name(), scenarios = scenarios.len()))]
    pub fn what_if(
        &self,
        plan: &MarkdownPlan,
        as_of: NaiveDate,
        skus: &[SkuSnapshot],
        scenarios: &[Scenario],
    ) -> Result<WhatIfReport> {
        let optimizer = MarkdownOptimizer::new(plan.clone(), self.config.markdown)?;
        let runner = SimulationRunner::new(&optimizer);

        let baseline = runner.simulate(as_of, skus, &Scenario::baseline("baseline"))?;
        let mut results = Vec::with_capacity(scenarios.len());
        let mut comparisons = Vec::with_capacity(scenarios.len());
        for scenario in scenarios {
            let result = runner.simulate(as_of, skus, scenario)?;
            comparisons.push(compare(&baseline, &result));
            results.push(result);
        }

        Ok(WhatIfReport {
            baseline,
            scenarios: results,
            comparisons,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use demand_forecast::{InMemoryObservationStore, Observation, RunStatus};

    fn store() -> InMemoryObservationStore {
        let mut store = InMemoryObservationStore::new();
        let first: NaiveDate = "2024-01-01".parse().unwrap();
        for week in 0..10 {
            store
                .insert(Observation {
                    entity_id: "SKU-1".to_string(),
                    week: first + chrono::Duration::weeks(week),
                    units_sold: 20.0,
                    stock_on_hand: 200.0,
                })
                .unwrap();
        }
        store
    }

    #[test]
    fn test_forecast_batch_keeps_entity_order() {
        let engine = InventoryDecisionEngine::new(EngineConfig::default()).unwrap();
        let config = engine
            .config()
            .forecast
            .forecast_config("flat", demand_forecast::ForecastMethod::MovingAverage, 4, 3, None)
            .unwrap();

        let runs = engine.forecast(&config, &store(), &["SKU-1", "SKU-2"]).unwrap();

        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].entity_id(), "SKU-1");
        assert_eq!(runs[0].status(), RunStatus::Completed);
        assert_eq!(runs[0].weekly_forecast(), &[20.0, 20.0, 20.0]);
        // no history at all
        assert_eq!(runs[1].status(), RunStatus::Failed);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = EngineConfig::default();
        config.markdown.remove_from_floor_ratio = 1.5;
        assert!(InventoryDecisionEngine::new(config).is_err());
    }
}
