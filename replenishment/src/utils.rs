//! Loading category snapshots from CSV
//!
//! The expected CSV format is:
//!
//! ```text
//! category_id,current_stock,monthly_rate,min_moc,target_moc,max_moc,unit_cost,lead_time_months,next_order_in_months,rate_history
//! KNITWEAR,480,120,1.5,3.0,5.0,12.5,1.0,0.5,90;100;110;120
//! ```
//!
//! `monthly_rate` may be left empty when no rate data exists. `rate_history`
//! is optional and lists monthly consumption, oldest first, separated by `;`.

use crate::error::{ReplenishmentError, Result};
use crate::moc::MocThresholds;
use crate::monitor::CategorySnapshot;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct CategoryRow {
    category_id: String,
    current_stock: f64,
    monthly_rate: Option<f64>,
    min_moc: f64,
    target_moc: f64,
    max_moc: f64,
    unit_cost: f64,
    lead_time_months: f64,
    next_order_in_months: f64,
    #[serde(default)]
    rate_history: Option<String>,
}

/// Load category snapshots from a CSV file
pub fn load_category_snapshots<P: AsRef<Path>>(file_path: P) -> Result<Vec<CategorySnapshot>> {
    let file = File::open(file_path)
        .map_err(|e| ReplenishmentError::DataLoad(format!("Failed to open file: {}", e)))?;
    read_category_snapshots(file)
}

/// Read category snapshots from any CSV source
pub fn read_category_snapshots<R: Read>(reader: R) -> Result<Vec<CategorySnapshot>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut snapshots = Vec::new();
    for (i, row) in csv_reader.deserialize::<CategoryRow>().enumerate() {
        // Header is line 1
        let line = i + 2;
        let row = row.map_err(|e| {
            ReplenishmentError::DataLoad(format!("Invalid record at line {}: {}", line, e))
        })?;

        let rate_history = parse_history(row.rate_history.as_deref()).map_err(|e| {
            ReplenishmentError::DataLoad(format!("Invalid rate_history at line {}: {}", line, e))
        })?;

        snapshots.push(CategorySnapshot {
            category_id: row.category_id,
            current_stock: row.current_stock,
            monthly_rate: row.monthly_rate,
            rate_history,
            thresholds: MocThresholds {
                min_moc: row.min_moc,
                target_moc: row.target_moc,
                max_moc: row.max_moc,
            },
            unit_cost: row.unit_cost,
            lead_time_months: row.lead_time_months,
            next_order_in_months: row.next_order_in_months,
        });
    }

    Ok(snapshots)
}

fn parse_history(field: Option<&str>) -> std::result::Result<Vec<f64>, std::num::ParseFloatError> {
    match field {
        Some(text) if !text.trim().is_empty() => {
            text.split(';').map(|v| v.trim().parse::<f64>()).collect()
        }
        _ => Ok(Vec::new()),
    }
}
