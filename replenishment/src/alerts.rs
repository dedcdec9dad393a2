//! Replenishment alerts

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of replenishment problem detected
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    BelowMinMoc,
    ApproachingMin,
    AboveMaxMoc,
    StockoutRisk,
    LeadTimeRisk,
}

impl AlertType {
    /// Severity each alert type is raised with
    pub fn severity(self) -> Severity {
        match self {
            AlertType::BelowMinMoc | AlertType::StockoutRisk => Severity::Critical,
            AlertType::ApproachingMin | AlertType::AboveMaxMoc | AlertType::LeadTimeRisk => {
                Severity::Warning
            }
        }
    }
}

/// Alert severity; orders with `Critical` first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Critical => write!(f, "CRITICAL"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Info => write!(f, "INFO"),
        }
    }
}

/// One alert for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplenishmentAlert {
    pub category_id: String,
    pub alert_type: AlertType,
    pub severity: Severity,
    pub current_moc: Option<f64>,
    pub target_moc: f64,
    pub suggested_order_qty: f64,
    pub suggested_order_value: f64,
    pub message: String,
    /// Always false when raised; acknowledgement happens downstream
    pub is_acknowledged: bool,
}

impl fmt::Display for ReplenishmentAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.category_id, self.message)
    }
}
