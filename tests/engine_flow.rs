use approx::assert_relative_eq;
use chrono::NaiveDate;
use otb_engine::demand_forecast::{ForecastMethod, ObservationLoader, RunStatus};
use otb_engine::markdown_engine::{
    MarkdownPlan, RecommendedAction, Scenario, ScenarioAdjustment, SkuDemand, SkuSnapshot,
};
use otb_engine::replenishment::utils::load_category_snapshots;
use otb_engine::replenishment::{AlertType, MocStatus};
use otb_engine::{EngineConfig, EngineError, InventoryDecisionEngine};
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::NamedTempFile;

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

// Twelve weeks from 2024-05-06 to 2024-07-22
fn observations_csv() -> NamedTempFile {
    let mut csv = String::from("entity_id,week,units_sold,stock_on_hand\n");
    let first = date("2024-05-06");
    for week in 0..12 {
        let day = first + chrono::Duration::weeks(week);
        csv.push_str(&format!("DR-001,{},10,{}\n", day, 180 - 10 * week));
        csv.push_str(&format!("DR-002,{},2,{}\n", day, 124 - 2 * week));
    }
    write_temp(&csv)
}

const PLAN_JSON: &str = r#"{
    "plan_name": "Summer exit",
    "plan_type": "SEASONAL",
    "status": "ACTIVE",
    "scope": { "season_id": "SS24", "brand_id": "ACME", "category_id": "DRESSES" },
    "plan_start_date": "2024-07-01",
    "plan_end_date": "2024-08-26",
    "target_sell_through_pct": 0.8,
    "max_markdown_pct": 0.5,
    "phases": [
        { "phase_order": 1, "name": "First cut", "start_date": "2024-07-01", "end_date": "2024-07-22", "markdown_pct": 0.2 },
        { "phase_order": 2, "name": "Second cut", "start_date": "2024-07-22", "end_date": "2024-08-12", "markdown_pct": 0.3 },
        { "phase_order": 3, "name": "Final", "start_date": "2024-08-12", "end_date": "2024-08-26", "markdown_pct": 0.5 }
    ]
}"#;

fn engine() -> InventoryDecisionEngine {
    let config = write_temp(
        r#"
        [forecast]
        confidence_level = 0.9

        [markdown]
        staleness_multiplier = 2.0

        [replenishment]
        warning_ratio = 0.8
        "#,
    );
    InventoryDecisionEngine::new(EngineConfig::load(config.path()).unwrap()).unwrap()
}

fn forecast_skus(engine: &InventoryDecisionEngine) -> Vec<SkuSnapshot> {
    let store = ObservationLoader::from_csv(observations_csv().path()).unwrap();
    let config = engine
        .config()
        .forecast
        .forecast_config("summer", ForecastMethod::MovingAverage, 4, 4, None)
        .unwrap();
    let runs = engine
        .forecast(&config, &store, &["DR-001", "DR-002"])
        .unwrap();

    assert!(runs.iter().all(|run| run.status() == RunStatus::Completed));
    assert_eq!(runs[0].weekly_forecast(), &[10.0; 4]);
    assert_eq!(runs[1].last_observed_week(), Some(date("2024-07-22")));

    let stock = [60.0, 100.0];
    runs.iter()
        .zip(stock)
        .map(|(run, current_stock)| SkuSnapshot {
            sku_id: run.entity_id().to_string(),
            current_stock,
            current_sell_through: 0.4,
            unit_price: 25.0,
            demand: SkuDemand::from_run(run).unwrap(),
            prior_plan: None,
        })
        .collect()
}

#[test]
fn test_forecast_then_markdown() {
    let engine = engine();
    let skus = forecast_skus(&engine);
    let plan: MarkdownPlan = serde_json::from_str(PLAN_JSON).unwrap();

    // Four weeks left; phase 1 is already over
    let result = engine.optimize(&plan, date("2024-07-29"), &skus).unwrap();
    assert_eq!(result.total_skus, 2);

    let steady = result.recommendation("DR-001").unwrap();
    assert_eq!(steady.recommended_action, RecommendedAction::IncludePhase2);
    assert_relative_eq!(steady.recommended_markdown_pct, 0.3);
    assert_relative_eq!(steady.predicted_sell_through, 1.0);
    assert_relative_eq!(steady.predicted_revenue, 1050.0, epsilon = 1e-9);
    assert!(steady.confidence_score > 0.0 && steady.confidence_score <= 1.0);

    // 50 weeks of cover against 4 remaining; even the ceiling sells 16%
    let slow = result.recommendation("DR-002").unwrap();
    assert_eq!(slow.recommended_action, RecommendedAction::RemoveFromFloor);
    assert_relative_eq!(slow.recommended_markdown_pct, 0.5);
    assert_relative_eq!(slow.predicted_sell_through, 0.16, epsilon = 1e-12);
    assert_eq!(slow.current_woc, Some(50.0));

    assert_relative_eq!(result.summary.total_expected_revenue, 1250.0, epsilon = 1e-9);
}

#[test]
fn test_what_if_against_baseline() {
    let engine = engine();
    let skus = forecast_skus(&engine);
    let plan: MarkdownPlan = serde_json::from_str(PLAN_JSON).unwrap();
    let as_of = date("2024-07-29");

    let deep = Scenario {
        name: "all at ceiling".to_string(),
        adjustments: vec![ScenarioAdjustment {
            sku_ids: Vec::new(),
            markdown_pct: 0.5,
        }],
    };
    let report = engine
        .what_if(&plan, as_of, &skus, &[Scenario::baseline("no change"), deep])
        .unwrap();

    let optimized = engine.optimize(&plan, as_of, &skus).unwrap();
    assert_relative_eq!(
        report.baseline.total_revenue,
        optimized.summary.total_expected_revenue
    );
    assert_relative_eq!(report.comparisons[0].revenue_delta, 0.0);

    // DR-001 sells out either way but at a deeper price cut
    assert_relative_eq!(report.scenarios[1].total_revenue, 950.0, epsilon = 1e-9);
    assert_relative_eq!(report.comparisons[1].revenue_delta, -300.0, epsilon = 1e-9);
    assert_relative_eq!(report.comparisons[1].units_delta, 0.0, epsilon = 1e-9);
}

#[test]
fn test_scenario_beyond_ceiling_rejected() {
    let engine = engine();
    let skus = forecast_skus(&engine);
    let plan: MarkdownPlan = serde_json::from_str(PLAN_JSON).unwrap();
    let scenario = Scenario {
        name: "too deep".to_string(),
        adjustments: vec![ScenarioAdjustment {
            sku_ids: vec!["DR-001".to_string()],
            markdown_pct: 0.7,
        }],
    };

    assert!(matches!(
        engine.simulate(&plan, date("2024-07-29"), &skus, &scenario),
        Err(EngineError::Markdown(_))
    ));
}

#[test]
fn test_monitor_categories() {
    let categories = write_temp(
        "category_id,current_stock,monthly_rate,min_moc,target_moc,max_moc,unit_cost,lead_time_months,next_order_in_months,rate_history\n\
         DRESSES,300,50,1.5,3.0,5.0,12.0,1.0,0.5,\n\
         KNITS,20,40,1.5,3.0,5.0,9.0,1.0,0.5,\n",
    );
    let snapshots = load_category_snapshots(categories.path()).unwrap();
    let report = engine().monitor(&snapshots).unwrap();

    assert_eq!(report.moc_for("DRESSES").unwrap().status, MocStatus::Overstock);
    assert_eq!(report.moc_for("KNITS").unwrap().status, MocStatus::Critical);

    let knits: Vec<AlertType> = report.alerts_for("KNITS").map(|a| a.alert_type).collect();
    assert!(knits.contains(&AlertType::BelowMinMoc));
    assert!(knits.contains(&AlertType::StockoutRisk));
    assert_eq!(report.alerts[0].category_id, "KNITS");
}

#[test]
fn test_config_file_errors() {
    let unknown = write_temp("[markdown]\nelasticity = 3.0\n");
    assert!(matches!(
        EngineConfig::load(unknown.path()),
        Err(EngineError::Toml(_))
    ));

    assert!(matches!(
        EngineConfig::load("/nonexistent/otb.toml"),
        Err(EngineError::Io(_))
    ));
}
