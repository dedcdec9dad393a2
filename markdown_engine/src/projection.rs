//! Linear sell-through projection
//!
//! Weekly demand comes from the forecast, repeating its last value beyond the
//! horizon. A markdown of depth `d` multiplies the weekly rate by
//! `1 + uplift_per_markdown_point * d` from the week it takes effect until the
//! end of the plan. Depths are capped at the plan ceiling.
//!
//! The optimizer and the what-if simulation share this module, so identical
//! inputs always project identical numbers.

/// Projection over one plan window, measured in weeks from the evaluation date
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    weeks_remaining: f64,
    uplift_per_markdown_point: f64,
    max_markdown_pct: f64,
}

impl Projection {
    pub fn new(
        weeks_remaining: f64,
        uplift_per_markdown_point: f64,
        max_markdown_pct: f64,
    ) -> Self {
        Self {
            weeks_remaining: weeks_remaining.max(0.0),
            uplift_per_markdown_point,
            max_markdown_pct,
        }
    }

    /// Weeks between the evaluation date and the end of the plan
    pub fn weeks_remaining(&self) -> f64 {
        self.weeks_remaining
    }

    /// Rate multiplier for a markdown depth
    pub fn uplift(&self, markdown_pct: f64) -> f64 {
        let depth = markdown_pct.clamp(0.0, self.max_markdown_pct);
        1.0 + self.uplift_per_markdown_point * depth
    }

    /// Units sold by the end of the plan when `markdown_pct` applies from
    /// `effective_from` weeks onward
    pub fn projected_units(&self, weekly: &[f64], markdown_pct: f64, effective_from: f64) -> f64 {
        let start = effective_from.clamp(0.0, self.weeks_remaining);
        let before = cumulative_demand(weekly, start);
        let after = cumulative_demand(weekly, self.weeks_remaining) - before;

        before + after * self.uplift(markdown_pct)
    }

    /// Share of `current_stock` sold by the end of the plan
    pub fn sell_through(
        &self,
        weekly: &[f64],
        current_stock: f64,
        markdown_pct: f64,
        effective_from: f64,
    ) -> f64 {
        // Nothing left to sell counts as fully sold through
        if current_stock <= 0.0 {
            return 1.0;
        }
        (self.projected_units(weekly, markdown_pct, effective_from) / current_stock).min(1.0)
    }
}

/// Demand accumulated over the first `weeks` weeks, fractional weeks included
pub fn cumulative_demand(weekly: &[f64], weeks: f64) -> f64 {
    let mut remaining = weeks.max(0.0);
    let mut total = 0.0;

    for &rate in weekly {
        if remaining <= 0.0 {
            return total;
        }
        let span = remaining.min(1.0);
        total += rate * span;
        remaining -= span;
    }

    if let Some(&last) = weekly.last() {
        total += last * remaining;
    }
    total
}
