//! # Replenishment
//!
//! `replenishment` converts stock and consumption rate into months of cover
//! (MOC) per category, classifies it against minimum, target and maximum
//! thresholds, and raises severity-ranked alerts with suggested order
//! quantities.
//!
//! Alerts are independent and may fire together for one category:
//!
//! - **Below min MOC** (critical) and **approaching min** (warning)
//! - **Above max MOC** (warning), including stock that is not moving at all
//! - **Stockout risk** (critical) when stock runs out before the next delivery
//! - **Lead time risk** (warning) when consumption accelerates and the lead
//!   time exceeds the remaining cover
//!
//! ## Usage Example
//!
//! ```no_run
//! use replenishment::{ReplenishmentMonitor, MonitorSettings};
//! use replenishment::utils::load_category_snapshots;
//!
//! let snapshots = load_category_snapshots("categories.csv").unwrap();
//! let monitor = ReplenishmentMonitor::new(MonitorSettings::default()).unwrap();
//!
//! let report = monitor.evaluate(&snapshots).unwrap();
//! for alert in &report.alerts {
//!     println!("{}", alert);
//! }
//! ```

pub mod alerts;
pub mod error;
pub mod moc;
pub mod monitor;
pub mod utils;

pub use alerts::{AlertType, ReplenishmentAlert, Severity};
pub use error::{ReplenishmentError, Result};
pub use moc::{classify, Cover, MocData, MocStatus, MocThresholds};
pub use monitor::{CategorySnapshot, MonitorReport, MonitorSettings, ReplenishmentMonitor};
