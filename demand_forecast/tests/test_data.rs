use chrono::NaiveDate;
use demand_forecast::data::{InMemoryObservationStore, Observation, ObservationLoader, WeeklySeries};
use demand_forecast::{ForecastError, ObservationSource};
use rstest::rstest;

fn obs(entity: &str, week: &str, units: f64) -> Observation {
    Observation {
        entity_id: entity.to_string(),
        week: week.parse::<NaiveDate>().unwrap(),
        units_sold: units,
        stock_on_hand: 50.0,
    }
}

#[test]
fn test_store_orders_out_of_sequence_inserts() {
    let mut store = InMemoryObservationStore::new();
    store
        .extend(vec![
            obs("SKU-1", "2024-01-15", 3.0),
            obs("SKU-1", "2024-01-01", 1.0),
            obs("SKU-1", "2024-01-08", 2.0),
        ])
        .unwrap();

    let series = store.weekly_series("SKU-1").unwrap();
    assert_eq!(series.units_sold(), vec![1.0, 2.0, 3.0]);
    assert_eq!(series.last_week(), Some("2024-01-15".parse().unwrap()));
}

#[test]
fn test_store_rejects_duplicate_week() {
    let mut store = InMemoryObservationStore::new();
    store.insert(obs("SKU-1", "2024-01-01", 1.0)).unwrap();
    assert!(matches!(
        store.insert(obs("SKU-1", "2024-01-01", 9.0)),
        Err(ForecastError::InvalidData(_))
    ));
}

#[test]
fn test_unknown_entity_gives_empty_series() {
    let store = InMemoryObservationStore::new();
    let series = store.weekly_series("SKU-404").unwrap();
    assert!(series.is_empty());
}

#[rstest]
#[case(-1.0)]
#[case(f64::NAN)]
#[case(f64::INFINITY)]
fn test_series_rejects_bad_units(#[case] units: f64) {
    let result = WeeklySeries::new("SKU-1", vec![obs("SKU-1", "2024-01-01", units)]);
    assert!(matches!(result, Err(ForecastError::InvalidData(_))));
}

#[test]
fn test_series_rejects_foreign_entity() {
    let result = WeeklySeries::new("SKU-1", vec![obs("SKU-2", "2024-01-01", 1.0)]);
    assert!(result.is_err());
}

#[test]
fn test_loader_reports_malformed_rows() {
    let csv = "entity_id,week,units_sold,stock_on_hand\nSKU-1,not-a-date,1,1\n";
    assert!(matches!(
        ObservationLoader::from_reader(csv.as_bytes()),
        Err(ForecastError::Csv(_))
    ));
}
