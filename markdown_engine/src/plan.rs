//! Markdown plans and their phases
//!
//! A plan is only constructed through [`MarkdownPlan::new`], which rejects
//! misordered, overlapping or over-deep phases before anything is computed.
//! Deserialization goes through the same checks.

use crate::error::{MarkdownError, Result};
use crate::utils::validate_range;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Most phases a plan may schedule, one per `IncludePhaseN` action
pub const MAX_PHASES: usize = 3;

/// Commercial purpose of a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanType {
    Seasonal,
    Promotional,
    Clearance,
    FlashSale,
}

/// Approval lifecycle of a plan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanStatus {
    #[default]
    Draft,
    PendingApproval,
    Approved,
    Active,
    Completed,
    Cancelled,
}

impl PlanStatus {
    /// Completed and cancelled plans never change again
    pub fn is_terminal(self) -> bool {
        matches!(self, PlanStatus::Completed | PlanStatus::Cancelled)
    }

    /// The single forward step from this state, if any
    pub fn next(self) -> Option<PlanStatus> {
        match self {
            PlanStatus::Draft => Some(PlanStatus::PendingApproval),
            PlanStatus::PendingApproval => Some(PlanStatus::Approved),
            PlanStatus::Approved => Some(PlanStatus::Active),
            PlanStatus::Active => Some(PlanStatus::Completed),
            PlanStatus::Completed | PlanStatus::Cancelled => None,
        }
    }

    /// Whether `self -> next` is a legal step
    pub fn can_transition_to(self, next: PlanStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        next == PlanStatus::Cancelled || self.next() == Some(next)
    }
}

/// Merchandise a plan applies to
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlanScope {
    pub season_id: String,
    pub brand_id: String,
    #[serde(default)]
    pub category_id: Option<String>,
}

/// A scheduled markdown depth within a plan, active over `[start_date, end_date)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkdownPhase {
    pub phase_order: u32,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Fraction of the full price taken off (0.3 = 30%)
    pub markdown_pct: f64,
}

/// Unvalidated plan as supplied by the caller or read from JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MarkdownPlanSpec {
    pub plan_name: String,
    pub plan_type: PlanType,
    #[serde(default)]
    pub status: PlanStatus,
    pub scope: PlanScope,
    pub plan_start_date: NaiveDate,
    pub plan_end_date: NaiveDate,
    pub target_sell_through_pct: f64,
    pub max_markdown_pct: f64,
    pub phases: Vec<MarkdownPhase>,
}

/// Validated markdown plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MarkdownPlanSpec", into = "MarkdownPlanSpec")]
pub struct MarkdownPlan {
    spec: MarkdownPlanSpec,
}

impl MarkdownPlan {
    /// Validate a plan and its phases
    pub fn new(spec: MarkdownPlanSpec) -> Result<Self> {
        if spec.plan_name.trim().is_empty() {
            return Err(MarkdownError::InvalidPlan(
                "plan_name must not be empty".to_string(),
            ));
        }
        if spec.scope.season_id.trim().is_empty() || spec.scope.brand_id.trim().is_empty() {
            return Err(MarkdownError::InvalidPlan(
                "Plan scope requires season_id and brand_id".to_string(),
            ));
        }
        if spec.plan_start_date >= spec.plan_end_date {
            return Err(MarkdownError::InvalidPlan(format!(
                "Plan window {} to {} is empty",
                spec.plan_start_date, spec.plan_end_date
            )));
        }

        validate_range(spec.max_markdown_pct, 0.0, 1.0, "max_markdown_pct")
            .map_err(MarkdownError::InvalidConfig)?;
        validate_range(
            spec.target_sell_through_pct,
            0.0,
            1.0,
            "target_sell_through_pct",
        )
        .map_err(MarkdownError::InvalidConfig)?;

        validate_phases(&spec)?;

        Ok(Self { spec })
    }

    pub fn plan_name(&self) -> &str {
        &self.spec.plan_name
    }

    pub fn plan_type(&self) -> PlanType {
        self.spec.plan_type
    }

    pub fn status(&self) -> PlanStatus {
        self.spec.status
    }

    pub fn scope(&self) -> &PlanScope {
        &self.spec.scope
    }

    pub fn plan_start_date(&self) -> NaiveDate {
        self.spec.plan_start_date
    }

    /// Exclusive end of the plan window
    pub fn plan_end_date(&self) -> NaiveDate {
        self.spec.plan_end_date
    }

    pub fn target_sell_through_pct(&self) -> f64 {
        self.spec.target_sell_through_pct
    }

    /// Hard ceiling for any phase, recommendation or override
    pub fn max_markdown_pct(&self) -> f64 {
        self.spec.max_markdown_pct
    }

    /// Phases in increasing `phase_order`
    pub fn phases(&self) -> &[MarkdownPhase] {
        &self.spec.phases
    }

    pub fn spec(&self) -> &MarkdownPlanSpec {
        &self.spec
    }

    /// Move the plan one step through its lifecycle, or cancel it
    pub fn transition_to(&mut self, next: PlanStatus) -> Result<()> {
        let current = self.spec.status;
        if !current.can_transition_to(next) {
            return Err(MarkdownError::InvalidTransition {
                from: current,
                to: next,
            });
        }
        self.spec.status = next;
        Ok(())
    }
}

fn validate_phases(spec: &MarkdownPlanSpec) -> Result<()> {
    let phases = &spec.phases;
    if phases.is_empty() || phases.len() > MAX_PHASES {
        return Err(MarkdownError::InvalidPlan(format!(
            "A plan needs between 1 and {} phases, got {}",
            MAX_PHASES,
            phases.len()
        )));
    }

    for phase in phases {
        if phase.start_date >= phase.end_date {
            return Err(MarkdownError::InvalidPlan(format!(
                "Phase {} has an empty window",
                phase.phase_order
            )));
        }
        if phase.start_date < spec.plan_start_date || phase.end_date > spec.plan_end_date {
            return Err(MarkdownError::InvalidPlan(format!(
                "Phase {} falls outside the plan window",
                phase.phase_order
            )));
        }
        if !phase.markdown_pct.is_finite()
            || phase.markdown_pct < 0.0
            || phase.markdown_pct > spec.max_markdown_pct
        {
            return Err(MarkdownError::InvalidPlan(format!(
                "Phase {} markdown {} exceeds the plan ceiling {}",
                phase.phase_order, phase.markdown_pct, spec.max_markdown_pct
            )));
        }
    }

    for pair in phases.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        if next.phase_order <= prev.phase_order {
            return Err(MarkdownError::InvalidPlan(format!(
                "phase_order must be strictly increasing ({} then {})",
                prev.phase_order, next.phase_order
            )));
        }
        if next.start_date < prev.end_date {
            return Err(MarkdownError::InvalidPlan(format!(
                "Phase {} overlaps phase {}",
                next.phase_order, prev.phase_order
            )));
        }
        if next.markdown_pct < prev.markdown_pct {
            return Err(MarkdownError::InvalidPlan(format!(
                "Phase {} marks down less than phase {}",
                next.phase_order, prev.phase_order
            )));
        }
    }

    Ok(())
}

impl TryFrom<MarkdownPlanSpec> for MarkdownPlan {
    type Error = MarkdownError;

    fn try_from(spec: MarkdownPlanSpec) -> Result<Self> {
        Self::new(spec)
    }
}

impl From<MarkdownPlan> for MarkdownPlanSpec {
    fn from(plan: MarkdownPlan) -> Self {
        plan.spec
    }
}
