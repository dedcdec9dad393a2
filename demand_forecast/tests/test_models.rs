use approx::assert_relative_eq;
use demand_forecast::models::exponential_smoothing::ExponentialSmoothing;
use demand_forecast::models::moving_average::MovingAverage;
use demand_forecast::models::trend_adjusted::TrendAdjusted;
use demand_forecast::models::{ForecastModel, TrainedForecastModel};
use demand_forecast::ForecastError;
use rstest::rstest;

const HISTORY: [f64; 10] = [40.0, 42.0, 38.0, 45.0, 50.0, 48.0, 52.0, 55.0, 53.0, 58.0];

#[test]
fn test_moving_average_uses_trailing_window() {
    let model = MovingAverage::new(4).unwrap();
    let forecast = model.train(&HISTORY).unwrap().forecast(2).unwrap();

    // (52 + 55 + 53 + 58) / 4
    assert_relative_eq!(forecast.values[0], 54.5, epsilon = 1e-9);
    assert_eq!(forecast.values[0], forecast.values[1]);
}

#[test]
fn test_exponential_smoothing_tracks_recent_values() {
    let slow = ExponentialSmoothing::new(10, 0.1).unwrap().train(&HISTORY).unwrap();
    let fast = ExponentialSmoothing::new(10, 0.9).unwrap().train(&HISTORY).unwrap();

    assert!(fast.level() > slow.level());
    assert!(fast.level() < 58.0);
}

#[test]
fn test_trend_adjusted_extends_line() {
    let model = TrendAdjusted::new(10).unwrap();
    let trained = model.train(&HISTORY).unwrap();
    let forecast = trained.forecast(3).unwrap();

    assert!(trained.fit().slope > 0.0);
    assert!(forecast.values[0] < forecast.values[1]);
    assert!(forecast.values[1] < forecast.values[2]);
    assert!(trained.variance() > 0.0);
}

#[rstest]
#[case(11)]
#[case(20)]
fn test_window_longer_than_history(#[case] window: usize) {
    let result = MovingAverage::new(window).unwrap().train(&HISTORY);
    assert!(matches!(
        result,
        Err(ForecastError::InsufficientHistory { available: 10, .. })
    ));
}

#[test]
fn test_zero_horizon_rejected() {
    let trained = MovingAverage::new(3).unwrap().train(&HISTORY).unwrap();
    assert!(trained.forecast(0).is_err());
}
