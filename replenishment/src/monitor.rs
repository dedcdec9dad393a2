//! Category-level replenishment monitor
//!
//! Each category is classified and checked for alerts independently; the
//! report lists alerts with the most severe first.

use crate::alerts::{AlertType, ReplenishmentAlert};
use crate::error::{ReplenishmentError, Result};
use crate::moc::{classify, Cover, MocData, MocThresholds};
use otb_math::{mean, LinearFit};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, instrument};

/// Current stock and consumption for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySnapshot {
    pub category_id: String,
    pub current_stock: f64,
    /// Units consumed per month; `None` when no rate data exists
    pub monthly_rate: Option<f64>,
    /// Recent monthly consumption, oldest first
    #[serde(default)]
    pub rate_history: Vec<f64>,
    pub thresholds: MocThresholds,
    pub unit_cost: f64,
    /// Months between placing an order and receiving it
    pub lead_time_months: f64,
    /// Months until the next scheduled order is placed
    pub next_order_in_months: f64,
}

impl CategorySnapshot {
    fn validate(&self) -> Result<()> {
        if self.category_id.trim().is_empty() {
            return Err(ReplenishmentError::InvalidInput(
                "category_id must not be empty".to_string(),
            ));
        }
        self.thresholds.validate().map_err(|e| match e {
            ReplenishmentError::InvalidThresholds(msg) => {
                ReplenishmentError::InvalidThresholds(format!("{}: {}", self.category_id, msg))
            }
            other => other,
        })?;

        let quantities = [
            ("current_stock", self.current_stock),
            ("unit_cost", self.unit_cost),
            ("lead_time_months", self.lead_time_months),
            ("next_order_in_months", self.next_order_in_months),
        ];
        for (name, value) in quantities {
            if !value.is_finite() || value < 0.0 {
                return Err(ReplenishmentError::InvalidInput(format!(
                    "{}: {} must be a non-negative number, got {}",
                    self.category_id, name, value
                )));
            }
        }
        if self.rate_history.iter().any(|v| !v.is_finite()) {
            return Err(ReplenishmentError::InvalidInput(format!(
                "{}: rate_history contains non-numeric values",
                self.category_id
            )));
        }
        Ok(())
    }

    /// Months until the next order placed on schedule arrives
    pub fn replenishment_horizon(&self) -> f64 {
        self.next_order_in_months + self.lead_time_months
    }
}

/// Tunable thresholds of the monitor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonitorSettings {
    /// Cover below `target_moc * warning_ratio` is a warning
    pub warning_ratio: f64,
    /// Monthly rate slope, relative to the mean rate, that counts as accelerating
    pub acceleration_threshold: f64,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            warning_ratio: 0.8,
            acceleration_threshold: 0.05,
        }
    }
}

impl MonitorSettings {
    pub fn validate(&self) -> Result<()> {
        if !(self.warning_ratio > 0.0 && self.warning_ratio <= 1.0) {
            return Err(ReplenishmentError::InvalidThresholds(format!(
                "warning_ratio must be in (0, 1], got {}",
                self.warning_ratio
            )));
        }
        if !self.acceleration_threshold.is_finite() || self.acceleration_threshold < 0.0 {
            return Err(ReplenishmentError::InvalidThresholds(format!(
                "acceleration_threshold must be non-negative, got {}",
                self.acceleration_threshold
            )));
        }
        Ok(())
    }
}

/// Output of one monitoring pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorReport {
    /// One record per category, in input order
    pub moc_data: Vec<MocData>,
    /// Alerts ordered by severity, then category, then type
    pub alerts: Vec<ReplenishmentAlert>,
}

impl MonitorReport {
    /// Alerts raised for one category
    pub fn alerts_for<'a>(
        &'a self,
        category_id: &'a str,
    ) -> impl Iterator<Item = &'a ReplenishmentAlert> + 'a {
        self.alerts
            .iter()
            .filter(move |a| a.category_id == category_id)
    }

    /// MOC record for one category
    pub fn moc_for(&self, category_id: &str) -> Option<&MocData> {
        self.moc_data.iter().find(|m| m.category_id == category_id)
    }
}

/// Evaluates months of cover and raises alerts
#[derive(Debug, Clone, Default)]
pub struct ReplenishmentMonitor {
    settings: MonitorSettings,
}

impl ReplenishmentMonitor {
    pub fn new(settings: MonitorSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &MonitorSettings {
        &self.settings
    }

    /// Classify every category and collect its alerts
    #[instrument(skip_all, fields(categories = snapshots.len()))]
    pub fn evaluate(&self, snapshots: &[CategorySnapshot]) -> Result<MonitorReport> {
        let mut seen = HashSet::with_capacity(snapshots.len());
        for snapshot in snapshots {
            snapshot.validate()?;
            if !seen.insert(snapshot.category_id.as_str()) {
                return Err(ReplenishmentError::InvalidInput(format!(
                    "Duplicate category '{}'",
                    snapshot.category_id
                )));
            }
        }

        let evaluated: Vec<(MocData, Vec<ReplenishmentAlert>)> = snapshots
            .par_iter()
            .map(|snapshot| self.evaluate_category(snapshot))
            .collect();

        let mut moc_data = Vec::with_capacity(evaluated.len());
        let mut alerts = Vec::new();
        for (data, category_alerts) in evaluated {
            moc_data.push(data);
            alerts.extend(category_alerts);
        }

        alerts.sort_by(|a, b| {
            a.severity
                .cmp(&b.severity)
                .then_with(|| a.category_id.cmp(&b.category_id))
                .then_with(|| a.alert_type.cmp(&b.alert_type))
        });

        info!(alerts = alerts.len(), "replenishment monitoring completed");
        Ok(MonitorReport { moc_data, alerts })
    }

    /// MOC record and alerts for one validated category
    pub fn evaluate_category(
        &self,
        snapshot: &CategorySnapshot,
    ) -> (MocData, Vec<ReplenishmentAlert>) {
        let thresholds = &snapshot.thresholds;
        let cover = Cover::from_rate(snapshot.current_stock, snapshot.monthly_rate);
        let status = classify(cover, thresholds, self.settings.warning_ratio);
        let current_moc = cover.months();

        let data = MocData {
            category_id: snapshot.category_id.clone(),
            current_stock: snapshot.current_stock,
            monthly_rate: snapshot.monthly_rate,
            current_moc,
            target_moc: thresholds.target_moc,
            min_moc: thresholds.min_moc,
            max_moc: thresholds.max_moc,
            status,
        };

        let rate = snapshot
            .monthly_rate
            .filter(|r| r.is_finite() && *r >= 0.0);
        let suggested_order_qty = match (current_moc, rate) {
            (Some(moc), Some(rate)) => ((thresholds.target_moc - moc) * rate).max(0.0),
            _ => 0.0,
        };
        let suggested_order_value = suggested_order_qty * snapshot.unit_cost;

        let alert = |alert_type: AlertType, message: String| ReplenishmentAlert {
            category_id: snapshot.category_id.clone(),
            alert_type,
            severity: alert_type.severity(),
            current_moc,
            target_moc: thresholds.target_moc,
            suggested_order_qty,
            suggested_order_value,
            message,
            is_acknowledged: false,
        };

        let mut alerts = Vec::new();
        match cover {
            Cover::Finite(moc) => {
                if moc < thresholds.min_moc {
                    alerts.push(alert(
                        AlertType::BelowMinMoc,
                        format!(
                            "Cover of {:.2} months is below the minimum of {:.2}",
                            moc, thresholds.min_moc
                        ),
                    ));
                } else if moc < thresholds.target_moc {
                    alerts.push(alert(
                        AlertType::ApproachingMin,
                        format!(
                            "Cover of {:.2} months is below the target of {:.2}",
                            moc, thresholds.target_moc
                        ),
                    ));
                }
                if moc > thresholds.max_moc {
                    alerts.push(alert(
                        AlertType::AboveMaxMoc,
                        format!(
                            "Cover of {:.2} months exceeds the maximum of {:.2}",
                            moc, thresholds.max_moc
                        ),
                    ));
                }
            }
            Cover::Unbounded => alerts.push(alert(
                AlertType::AboveMaxMoc,
                "Stock on hand with no consumption".to_string(),
            )),
            Cover::Unknown => {}
        }

        let slope = rate_trend(&snapshot.rate_history);

        if let Some(rate) = rate {
            let horizon = snapshot.replenishment_horizon();
            // Rising consumption is averaged over the horizon
            let effective_rate = rate + slope.map_or(0.0, |s| s.max(0.0)) * horizon / 2.0;
            if effective_rate > 0.0 {
                let months_to_zero = snapshot.current_stock / effective_rate;
                if months_to_zero < horizon {
                    alerts.push(alert(
                        AlertType::StockoutRisk,
                        format!(
                            "Stock runs out in {:.2} months, next delivery in {:.2}",
                            months_to_zero, horizon
                        ),
                    ));
                }
            }
        }

        if let (Some(slope), Some(moc)) = (slope, current_moc) {
            let mean_rate = mean(&snapshot.rate_history).unwrap_or(0.0);
            let accelerating =
                mean_rate > 0.0 && slope / mean_rate > self.settings.acceleration_threshold;
            if accelerating && snapshot.lead_time_months > moc {
                alerts.push(alert(
                    AlertType::LeadTimeRisk,
                    format!(
                        "Consumption is accelerating and lead time of {:.2} months exceeds cover of {:.2}",
                        snapshot.lead_time_months, moc
                    ),
                ));
            }
        }

        debug!(
            category = %snapshot.category_id,
            status = ?status,
            alerts = alerts.len(),
            "evaluated category"
        );

        (data, alerts)
    }
}

/// Monthly change in consumption; needs at least two months of history
fn rate_trend(history: &[f64]) -> Option<f64> {
    if history.len() < 2 {
        return None;
    }
    LinearFit::fit(history).ok().map(|fit| fit.slope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::Severity;
    use crate::moc::MocStatus;
    use approx::assert_relative_eq;

    fn snapshot(id: &str, stock: f64, rate: Option<f64>) -> CategorySnapshot {
        CategorySnapshot {
            category_id: id.to_string(),
            current_stock: stock,
            monthly_rate: rate,
            rate_history: Vec::new(),
            thresholds: MocThresholds::new(1.5, 3.0, 5.0).unwrap(),
            unit_cost: 4.0,
            lead_time_months: 0.5,
            next_order_in_months: 1.0,
        }
    }

    #[test]
    fn test_approaching_min_example() {
        let monitor = ReplenishmentMonitor::default();
        let (data, alerts) = monitor.evaluate_category(&snapshot("TOPS", 50.0, Some(25.0)));

        assert_eq!(data.current_moc, Some(2.0));
        assert_eq!(data.status, MocStatus::Warning);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::ApproachingMin);
        assert_eq!(alerts[0].severity, Severity::Warning);
        assert_relative_eq!(alerts[0].suggested_order_qty, 25.0);
        assert_relative_eq!(alerts[0].suggested_order_value, 100.0);
        assert!(!alerts[0].is_acknowledged);
    }

    #[test]
    fn test_zero_rate_with_stock() {
        let monitor = ReplenishmentMonitor::default();
        let (data, alerts) = monitor.evaluate_category(&snapshot("HATS", 10.0, Some(0.0)));

        assert_eq!(data.status, MocStatus::Overstock);
        assert_eq!(data.current_moc, None);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::AboveMaxMoc);
        assert_eq!(alerts[0].suggested_order_qty, 0.0);
    }

    #[test]
    fn test_missing_rate_is_unknown_without_alerts() {
        let monitor = ReplenishmentMonitor::default();
        let (data, alerts) = monitor.evaluate_category(&snapshot("BAGS", 10.0, None));

        assert_eq!(data.status, MocStatus::Unknown);
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_stockout_risk_with_adequate_cover() {
        let monitor = ReplenishmentMonitor::default();
        let mut fast = snapshot("KNIT", 100.0, Some(40.0));
        fast.lead_time_months = 2.0;
        fast.next_order_in_months = 1.0;

        // 2.5 months of cover, next delivery in 3
        let (data, alerts) = monitor.evaluate_category(&fast);
        assert_eq!(data.status, MocStatus::Healthy);
        assert_eq!(alerts.len(), 2);
        assert!(alerts
            .iter()
            .any(|a| a.alert_type == AlertType::StockoutRisk && a.severity == Severity::Critical));
    }

    #[test]
    fn test_accelerating_consumption() {
        let monitor = ReplenishmentMonitor::default();
        let mut category = snapshot("DENIM", 60.0, Some(40.0));
        category.rate_history = vec![20.0, 25.0, 30.0, 35.0, 40.0];
        category.lead_time_months = 2.0;
        category.next_order_in_months = 0.0;

        let (_, alerts) = monitor.evaluate_category(&category);
        let types: Vec<AlertType> = alerts.iter().map(|a| a.alert_type).collect();

        // Cover 1.5; slope 5 on a mean of 30; effective rate 40 + 5 = 45
        assert!(types.contains(&AlertType::LeadTimeRisk));
        assert!(types.contains(&AlertType::StockoutRisk));
        assert!(types.contains(&AlertType::ApproachingMin));
    }

    #[test]
    fn test_report_sorted_by_severity() {
        let monitor = ReplenishmentMonitor::new(MonitorSettings::default()).unwrap();
        let report = monitor
            .evaluate(&[
                snapshot("A-OVER", 300.0, Some(50.0)),
                snapshot("B-LOW", 10.0, Some(25.0)),
                snapshot("C-WARN", 50.0, Some(25.0)),
            ])
            .unwrap();

        assert_eq!(report.moc_data.len(), 3);
        assert_eq!(report.moc_data[0].category_id, "A-OVER");
        assert_eq!(report.alerts[0].severity, Severity::Critical);
        assert!(report
            .alerts
            .windows(2)
            .all(|pair| pair[0].severity <= pair[1].severity));
        assert_eq!(report.alerts_for("B-LOW").count(), 2);
    }

    #[test]
    fn test_rejects_bad_input() {
        let monitor = ReplenishmentMonitor::default();
        let mut bad = snapshot("X", 10.0, Some(1.0));
        bad.thresholds.min_moc = 4.0;
        assert!(matches!(
            monitor.evaluate(&[bad]),
            Err(ReplenishmentError::InvalidThresholds(_))
        ));

        let dup = [snapshot("X", 1.0, None), snapshot("X", 1.0, None)];
        assert!(monitor.evaluate(&dup).is_err());

        assert!(ReplenishmentMonitor::new(MonitorSettings {
            warning_ratio: 0.0,
            ..MonitorSettings::default()
        })
        .is_err());
    }
}
