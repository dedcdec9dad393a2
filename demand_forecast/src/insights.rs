//! Human-readable observations about a forecast

use crate::config::InsightThresholds;
use crate::metrics::AccuracyMetrics;
use otb_math::{coefficient_of_variation, mean, LinearFit};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Notable property of the demand history or the forecast built from it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ForecastInsight {
    /// Demand is rising faster than the threshold allows for a flat plan
    StrongUpwardTrend { weekly_change_pct: f64 },
    /// Demand is falling faster than the threshold
    StrongDownwardTrend { weekly_change_pct: f64 },
    /// Spread of weekly demand is large relative to its mean
    HighVolatility { coefficient_of_variation: f64 },
    /// Back-test accuracy is below the trust threshold
    LowAccuracy { accuracy: f64 },
    /// Not enough history to hold out weeks for a back-test
    AccuracyUnavailable,
    /// Back-test ran but no held-out week had sales, so accuracy is undefined
    NoHoldoutDemand,
    /// Nothing sold during the lookback window
    NoRecentDemand,
}

impl fmt::Display for ForecastInsight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForecastInsight::StrongUpwardTrend { weekly_change_pct } => write!(
                f,
                "Demand is trending up by {:.1}% of mean per week",
                weekly_change_pct
            ),
            ForecastInsight::StrongDownwardTrend { weekly_change_pct } => write!(
                f,
                "Demand is trending down by {:.1}% of mean per week",
                weekly_change_pct.abs()
            ),
            ForecastInsight::HighVolatility {
                coefficient_of_variation,
            } => write!(
                f,
                "Demand is volatile (coefficient of variation {:.2})",
                coefficient_of_variation
            ),
            ForecastInsight::LowAccuracy { accuracy } => write!(
                f,
                "Back-tested accuracy is low ({:.1}%)",
                accuracy * 100.0
            ),
            ForecastInsight::AccuracyUnavailable => {
                write!(f, "Not enough history to back-test this forecast")
            }
            ForecastInsight::NoHoldoutDemand => {
                write!(f, "No sales in the back-test weeks, accuracy is undefined")
            }
            ForecastInsight::NoRecentDemand => {
                write!(f, "No units sold during the lookback window")
            }
        }
    }
}

/// Derive insights from the lookback window, its trend and the back-test
pub fn derive_insights(
    window: &[f64],
    trend: &LinearFit,
    accuracy: Option<&AccuracyMetrics>,
    thresholds: &InsightThresholds,
) -> Vec<ForecastInsight> {
    let mut insights = Vec::new();

    match mean(window) {
        Ok(avg) if avg > 0.0 => {
            let ratio = trend.slope / avg;
            if ratio >= thresholds.trend_slope_ratio {
                insights.push(ForecastInsight::StrongUpwardTrend {
                    weekly_change_pct: ratio * 100.0,
                });
            } else if ratio <= -thresholds.trend_slope_ratio {
                insights.push(ForecastInsight::StrongDownwardTrend {
                    weekly_change_pct: ratio * 100.0,
                });
            }
        }
        _ => insights.push(ForecastInsight::NoRecentDemand),
    }

    if let Ok(Some(cv)) = coefficient_of_variation(window) {
        if cv > thresholds.volatility_cv {
            insights.push(ForecastInsight::HighVolatility {
                coefficient_of_variation: cv,
            });
        }
    }

    match accuracy.map(|m| m.accuracy) {
        Some(Some(acc)) if acc < thresholds.low_accuracy => {
            insights.push(ForecastInsight::LowAccuracy { accuracy: acc })
        }
        Some(Some(_)) => {}
        Some(None) => insights.push(ForecastInsight::NoHoldoutDemand),
        None => insights.push(ForecastInsight::AccuracyUnavailable),
    }

    insights
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insights_for(window: &[f64], accuracy: Option<AccuracyMetrics>) -> Vec<ForecastInsight> {
        let trend = LinearFit::fit(window).unwrap();
        derive_insights(
            window,
            &trend,
            accuracy.as_ref(),
            &InsightThresholds::default(),
        )
    }

    fn perfect() -> AccuracyMetrics {
        AccuracyMetrics::evaluate(&[1.0], &[1.0]).unwrap()
    }

    #[test]
    fn test_flat_history_is_quiet() {
        assert!(insights_for(&[100.0; 8], Some(perfect())).is_empty());
    }

    #[test]
    fn test_trend_direction() {
        let rising: Vec<f64> = (1..=8).map(|w| 10.0 * w as f64).collect();
        let insights = insights_for(&rising, Some(perfect()));
        assert!(matches!(
            insights[0],
            ForecastInsight::StrongUpwardTrend { .. }
        ));

        let falling: Vec<f64> = rising.iter().rev().copied().collect();
        let insights = insights_for(&falling, Some(perfect()));
        assert!(matches!(
            insights[0],
            ForecastInsight::StrongDownwardTrend { .. }
        ));
        assert!(insights[0].to_string().contains("trending down"));
    }

    #[test]
    fn test_volatility_and_missing_accuracy() {
        let insights = insights_for(&[0.0, 200.0, 0.0, 200.0], None);
        assert!(insights
            .iter()
            .any(|i| matches!(i, ForecastInsight::HighVolatility { .. })));
        assert!(insights.contains(&ForecastInsight::AccuracyUnavailable));
    }

    #[test]
    fn test_no_recent_demand() {
        let insights = insights_for(&[0.0; 4], Some(perfect()));
        assert_eq!(insights, vec![ForecastInsight::NoRecentDemand]);
    }

    #[test]
    fn test_backtest_without_sales_is_not_missing_history() {
        let zero_holdout = AccuracyMetrics::evaluate(&[3.0, 3.0], &[0.0, 0.0]).unwrap();
        assert_eq!(zero_holdout.accuracy, None);

        let insights = insights_for(&[5.0, 0.0, 4.0, 0.0], Some(zero_holdout));
        assert!(insights.contains(&ForecastInsight::NoHoldoutDemand));
        assert!(!insights.contains(&ForecastInsight::AccuracyUnavailable));
    }
}
