//! # Markdown Engine
//!
//! `markdown_engine` decides phased markdown and clearance actions per SKU so
//! that a plan reaches its target sell-through by its end date.
//!
//! ## Decision ladder
//!
//! For every SKU, in order:
//!
//! - **No action** when the forecast alone reaches the target
//! - **Include phase N** for the first scheduled phase whose depth closes the gap
//! - **Immediate clear** at the plan ceiling when stock is stale or no phase remains
//! - **Remove from floor** when even clearing leaves sell-through far below target
//!
//! Otherwise the deepest remaining phase is recommended as a best effort.
//!
//! ## Usage Example
//!
//! ```no_run
//! use markdown_engine::{MarkdownOptimizer, MarkdownPlan, OptimizerSettings, SkuSnapshot};
//! use markdown_engine::{Scenario, SimulationRunner};
//!
//! # fn run(plan: MarkdownPlan, skus: Vec<SkuSnapshot>) -> markdown_engine::Result<()> {
//! let optimizer = MarkdownOptimizer::new(plan, OptimizerSettings::default())?;
//! let as_of = "2024-03-04".parse().expect("valid date");
//!
//! let result = optimizer.optimize(as_of, &skus)?;
//! println!("Expected revenue: {}", result.summary.total_expected_revenue);
//!
//! let runner = SimulationRunner::new(&optimizer);
//! let what_if = runner.simulate(as_of, &skus, &Scenario::baseline("As planned"))?;
//! assert_eq!(what_if.total_revenue, result.summary.total_expected_revenue);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod optimizer;
pub mod plan;
pub mod projection;
pub mod simulation;
pub mod sku;
pub mod utils;

pub use error::{MarkdownError, Result};
pub use optimizer::{MarkdownOptimizer, OptimizationResult, OptimizationSummary, OptimizerSettings};
pub use plan::{MarkdownPhase, MarkdownPlan, MarkdownPlanSpec, PlanScope, PlanStatus, PlanType};
pub use projection::Projection;
pub use simulation::{
    compare, Scenario, ScenarioAdjustment, ScenarioComparison, SimulationResult, SimulationRunner,
};
pub use sku::{MarkdownSkuPlan, RecommendedAction, SkuDemand, SkuSnapshot};
