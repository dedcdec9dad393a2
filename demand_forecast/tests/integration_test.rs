use approx::assert_relative_eq;
use demand_forecast::utils::{generate_weekly_history, series_from_units};
use demand_forecast::{
    execute, ForecastConfig, ForecastConfigSpec, ForecastError, ForecastInsight, ForecastMethod,
    InsightThresholds, ObservationLoader, ObservationSource, RunStatus,
};
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::NamedTempFile;

fn config(method: ForecastMethod, weights: (f64, f64, f64)) -> ForecastConfig {
    ForecastConfig::new(ForecastConfigSpec {
        name: format!("{} test", method),
        primary_method: method,
        lookback_weeks: 8,
        forecast_weeks: 4,
        moving_avg_weight: weights.0,
        exp_smooth_weight: weights.1,
        trend_weight: weights.2,
        ..ForecastConfigSpec::default()
    })
    .unwrap()
}

// Helper function to create a CSV with two SKUs
fn create_sample_data() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();

    writeln!(file, "entity_id,week,units_sold,stock_on_hand").unwrap();
    for week in 0..12 {
        let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
            + chrono::Duration::weeks(week);
        writeln!(file, "SKU-A, {}, 100, {}", date, 1200 - 100 * week).unwrap();
        writeln!(file, "SKU-B, {}, {}, 500", date, 10 * (week + 1)).unwrap();
    }

    file
}

#[test]
fn test_flat_demand_end_to_end() {
    let series =
        series_from_units("SKU-A", "2024-01-01".parse().unwrap(), &[100.0; 12]).unwrap();
    let run = execute(
        &config(ForecastMethod::MovingAverage, (1.0, 0.0, 0.0)),
        &series,
        &InsightThresholds::default(),
    );

    assert_eq!(run.status(), RunStatus::Completed);
    assert_eq!(run.weekly_forecast(), &[100.0; 4]);
    assert_eq!(run.accuracy(), Some(1.0));
    assert_eq!(run.mape(), Some(0.0));
    assert_eq!(run.rmse(), Some(0.0));
    assert!(run.insights().is_empty());
    for bound in run.confidence_band() {
        assert_eq!(bound.lower, 100.0);
        assert_eq!(bound.upper, 100.0);
    }
}

#[test]
fn test_single_weight_ensemble_matches_method() {
    let history = generate_weekly_history(16, 80.0, 1.5, 6.0, 7).unwrap();
    let series = series_from_units("SKU-A", "2024-01-01".parse().unwrap(), &history).unwrap();
    let thresholds = InsightThresholds::default();

    let pairs = [
        (ForecastMethod::MovingAverage, (1.0, 0.0, 0.0)),
        (ForecastMethod::ExponentialSmoothing, (0.0, 1.0, 0.0)),
        (ForecastMethod::TrendAdjusted, (0.0, 0.0, 1.0)),
    ];

    for (method, weights) in pairs {
        let single = execute(&config(method, weights), &series, &thresholds);
        let blended = execute(
            &config(ForecastMethod::Ensemble, weights),
            &series,
            &thresholds,
        );

        assert_eq!(single.weekly_forecast(), blended.weekly_forecast());
        assert_eq!(single.confidence_band(), blended.confidence_band());
        assert_eq!(single.accuracy(), blended.accuracy());
    }
}

#[test]
fn test_rising_demand_with_trend_method() {
    let units: Vec<f64> = (1..=12).map(|w| 10.0 * w as f64).collect();
    let series = series_from_units("SKU-B", "2024-01-01".parse().unwrap(), &units).unwrap();
    let run = execute(
        &config(ForecastMethod::TrendAdjusted, (0.0, 0.0, 1.0)),
        &series,
        &InsightThresholds::default(),
    );

    assert_eq!(run.status(), RunStatus::Completed);
    for (i, value) in run.weekly_forecast().iter().enumerate() {
        assert_relative_eq!(*value, 130.0 + 10.0 * i as f64, epsilon = 1e-9);
    }
    assert_relative_eq!(run.accuracy().unwrap(), 1.0, epsilon = 1e-9);
    assert!(matches!(
        run.insights()[0],
        ForecastInsight::StrongUpwardTrend { .. }
    ));
}

#[test]
fn test_short_history_fails_without_partial_output() {
    let series = series_from_units("SKU-A", "2024-01-01".parse().unwrap(), &[5.0; 5]).unwrap();
    let run = execute(
        &config(ForecastMethod::Ensemble, (0.4, 0.3, 0.3)),
        &series,
        &InsightThresholds::default(),
    );

    assert_eq!(run.status(), RunStatus::Failed);
    assert!(run.weekly_forecast().is_empty());
    assert!(run.confidence_band().is_empty());
    assert!(run.failure_reason().unwrap().contains("need at least 8"));
}

#[test]
fn test_forecast_from_csv() {
    let data_file = create_sample_data();
    let store = ObservationLoader::from_csv(data_file.path()).unwrap();

    let ids: Vec<&str> = store.entity_ids().collect();
    assert_eq!(ids, vec!["SKU-A", "SKU-B"]);

    let series = store.weekly_series("SKU-A").unwrap();
    assert_eq!(series.len(), 12);
    assert_eq!(series.latest_stock(), Some(100.0));

    let run = execute(
        &config(ForecastMethod::MovingAverage, (1.0, 0.0, 0.0)),
        &series,
        &InsightThresholds::default(),
    );
    assert_eq!(run.weekly_forecast(), &[100.0; 4]);
    assert_eq!(run.last_observed_week(), series.last_week());
}

#[test]
fn test_missing_file() {
    assert!(matches!(
        ObservationLoader::from_csv("/nonexistent/observations.csv"),
        Err(ForecastError::Io(_))
    ));
}

#[test]
fn test_run_serializes() {
    let series =
        series_from_units("SKU-A", "2024-01-01".parse().unwrap(), &[40.0; 12]).unwrap();
    let run = execute(
        &config(ForecastMethod::MovingAverage, (1.0, 0.0, 0.0)),
        &series,
        &InsightThresholds::default(),
    );

    let json = serde_json::to_value(&run).unwrap();
    assert_eq!(json["status"], "COMPLETED");
    assert_eq!(json["method"], "MOVING_AVERAGE");
}
