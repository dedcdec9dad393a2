use approx::assert_relative_eq;
use replenishment::utils::load_category_snapshots;
use replenishment::{
    AlertType, MocStatus, MonitorSettings, ReplenishmentError, ReplenishmentMonitor, Severity,
};
use rstest::rstest;
use std::io::Write;
use tempfile::NamedTempFile;

fn create_category_file(rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "category_id,current_stock,monthly_rate,min_moc,target_moc,max_moc,unit_cost,lead_time_months,next_order_in_months,rate_history"
    )
    .unwrap();
    for row in rows {
        writeln!(file, "{}", row).unwrap();
    }
    file
}

#[test]
fn test_monitor_from_csv() {
    let file = create_category_file(&[
        "TOPS,50,25,1.5,3.0,5.0,8.0,0.5,1.0,",
        "HATS,10,0,1.5,3.0,5.0,6.0,0.5,1.0,",
        "SHOES,5,20,1.5,3.0,5.0,30.0,1.0,0.5,",
    ]);
    let snapshots = load_category_snapshots(file.path()).unwrap();
    let report = ReplenishmentMonitor::new(MonitorSettings::default())
        .unwrap()
        .evaluate(&snapshots)
        .unwrap();

    let tops = report.moc_for("TOPS").unwrap();
    assert_eq!(tops.current_moc, Some(2.0));
    assert_eq!(tops.status, MocStatus::Warning);
    let tops_alerts: Vec<_> = report.alerts_for("TOPS").collect();
    assert_eq!(tops_alerts.len(), 1);
    assert_eq!(tops_alerts[0].alert_type, AlertType::ApproachingMin);
    assert_relative_eq!(tops_alerts[0].suggested_order_qty, 25.0);
    assert_relative_eq!(tops_alerts[0].suggested_order_value, 200.0);

    assert_eq!(report.moc_for("HATS").unwrap().status, MocStatus::Overstock);

    // 0.25 months of cover: below minimum and out before the next delivery
    let shoes: Vec<AlertType> = report.alerts_for("SHOES").map(|a| a.alert_type).collect();
    assert_eq!(shoes, vec![AlertType::BelowMinMoc, AlertType::StockoutRisk]);
    assert_eq!(report.alerts[0].severity, Severity::Critical);
    assert_eq!(report.alerts[0].category_id, "SHOES");
}

#[rstest]
#[case(0.5, MocStatus::Critical)]
#[case(2.0, MocStatus::Warning)]
#[case(4.0, MocStatus::Healthy)]
#[case(8.0, MocStatus::Overstock)]
fn test_status_priority(#[case] moc: f64, #[case] expected: MocStatus) {
    let stock = moc * 10.0;
    let file = create_category_file(&[&format!("CAT,{},10,1.5,3.0,5.0,1.0,0,0,", stock)]);
    let snapshots = load_category_snapshots(file.path()).unwrap();
    let report = ReplenishmentMonitor::default().evaluate(&snapshots).unwrap();

    assert_eq!(report.moc_data[0].status, expected);
}

#[test]
fn test_missing_file() {
    assert!(matches!(
        load_category_snapshots("/nonexistent/categories.csv"),
        Err(ReplenishmentError::DataLoad(_))
    ));
}

#[test]
fn test_report_serializes_closed_enums() {
    let file = create_category_file(&["TOPS,50,25,1.5,3.0,5.0,8.0,0.5,1.0,"]);
    let snapshots = load_category_snapshots(file.path()).unwrap();
    let report = ReplenishmentMonitor::default().evaluate(&snapshots).unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["moc_data"][0]["status"], "WARNING");
    assert_eq!(json["alerts"][0]["alert_type"], "APPROACHING_MIN");
    assert_eq!(json["alerts"][0]["is_acknowledged"], false);
}
