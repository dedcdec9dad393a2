//! Months-of-cover calculation and status classification
//!
//! `current_moc = current_stock / monthly_rate`. A zero rate is a normal
//! operating condition, not an error: the cover is unbounded, which reads as
//! overstock when there is stock and as unknown when there is none.

use crate::error::{ReplenishmentError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum, target and maximum months of cover for a category
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MocThresholds {
    pub min_moc: f64,
    pub target_moc: f64,
    pub max_moc: f64,
}

impl MocThresholds {
    /// Create thresholds, requiring `0 <= min <= target <= max`
    pub fn new(min_moc: f64, target_moc: f64, max_moc: f64) -> Result<Self> {
        let thresholds = Self {
            min_moc,
            target_moc,
            max_moc,
        };
        thresholds.validate()?;
        Ok(thresholds)
    }

    pub fn validate(&self) -> Result<()> {
        let values = [self.min_moc, self.target_moc, self.max_moc];
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(ReplenishmentError::InvalidThresholds(format!(
                "MOC thresholds must be non-negative numbers, got {}",
                self
            )));
        }
        if self.min_moc > self.target_moc || self.target_moc > self.max_moc {
            return Err(ReplenishmentError::InvalidThresholds(format!(
                "MOC thresholds must satisfy min <= target <= max, got {}",
                self
            )));
        }
        Ok(())
    }
}

impl fmt::Display for MocThresholds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "min {:.2} / target {:.2} / max {:.2}",
            self.min_moc, self.target_moc, self.max_moc
        )
    }
}

/// Health of a category's cover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MocStatus {
    Critical,
    Warning,
    Overstock,
    Healthy,
    Unknown,
}

/// Months of cover, including the cases where no finite value exists
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cover {
    Finite(f64),
    /// Stock on hand but nothing is being consumed
    Unbounded,
    /// Rate missing or unusable
    Unknown,
}

impl Cover {
    /// Compute cover from stock and an optional monthly consumption rate
    pub fn from_rate(current_stock: f64, monthly_rate: Option<f64>) -> Self {
        match monthly_rate {
            Some(rate) if rate.is_finite() && rate > 0.0 => Cover::Finite(current_stock / rate),
            Some(rate) if rate == 0.0 && current_stock > 0.0 => Cover::Unbounded,
            _ => Cover::Unknown,
        }
    }

    /// Finite months of cover, if any
    pub fn months(self) -> Option<f64> {
        match self {
            Cover::Finite(moc) => Some(moc),
            Cover::Unbounded | Cover::Unknown => None,
        }
    }
}

/// Classify cover against thresholds; the first matching rule wins
pub fn classify(cover: Cover, thresholds: &MocThresholds, warning_ratio: f64) -> MocStatus {
    match cover {
        Cover::Finite(moc) => {
            if moc < thresholds.min_moc {
                MocStatus::Critical
            } else if moc < thresholds.target_moc * warning_ratio {
                MocStatus::Warning
            } else if moc > thresholds.max_moc {
                MocStatus::Overstock
            } else if moc >= thresholds.min_moc && moc <= thresholds.max_moc {
                MocStatus::Healthy
            } else {
                MocStatus::Unknown
            }
        }
        Cover::Unbounded => MocStatus::Overstock,
        Cover::Unknown => MocStatus::Unknown,
    }
}

/// Months-of-cover record for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MocData {
    pub category_id: String,
    pub current_stock: f64,
    /// Units consumed per month; absent when no rate data exists
    pub monthly_rate: Option<f64>,
    /// Absent when cover is unbounded or unknown
    pub current_moc: Option<f64>,
    pub target_moc: f64,
    pub min_moc: f64,
    pub max_moc: f64,
    pub status: MocStatus,
}
