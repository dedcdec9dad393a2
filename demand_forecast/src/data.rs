//! Weekly observation handling for forecasting
//!
//! Observations are supplied by an external time-series store. The engine only
//! needs four fields per record and never mutates what it receives.

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// One week of sales and stock for an entity (SKU, category or brand key)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// SKU, category or brand key depending on aggregation level
    pub entity_id: String,
    /// Start date of the week
    pub week: NaiveDate,
    /// Units sold during the week
    pub units_sold: f64,
    /// Stock on hand at the end of the week
    pub stock_on_hand: f64,
}

/// Validated, week-ordered observations for a single entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklySeries {
    entity_id: String,
    observations: Vec<Observation>,
}

impl WeeklySeries {
    /// Create a series, checking entity, ordering and quantities
    pub fn new(entity_id: impl Into<String>, observations: Vec<Observation>) -> Result<Self> {
        let entity_id = entity_id.into();
        if entity_id.trim().is_empty() {
            return Err(ForecastError::InvalidData(
                "Entity id must not be empty".to_string(),
            ));
        }

        for (i, obs) in observations.iter().enumerate() {
            if obs.entity_id != entity_id {
                return Err(ForecastError::InvalidData(format!(
                    "Observation {} belongs to '{}', expected '{}'",
                    i, obs.entity_id, entity_id
                )));
            }
            if !obs.units_sold.is_finite() || obs.units_sold < 0.0 {
                return Err(ForecastError::InvalidData(format!(
                    "Units sold for week {} must be a non-negative number",
                    obs.week
                )));
            }
            if !obs.stock_on_hand.is_finite() || obs.stock_on_hand < 0.0 {
                return Err(ForecastError::InvalidData(format!(
                    "Stock on hand for week {} must be a non-negative number",
                    obs.week
                )));
            }
        }

        if let Some(pair) = observations.windows(2).find(|w| w[1].week <= w[0].week) {
            return Err(ForecastError::InvalidData(format!(
                "Observations must be strictly ordered by week ({} follows {})",
                pair[1].week, pair[0].week
            )));
        }

        Ok(Self {
            entity_id,
            observations,
        })
    }

    /// Entity key of the series
    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    /// All observations, oldest first
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Units sold per week, oldest first
    pub fn units_sold(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.units_sold).collect()
    }

    /// Week of the most recent observation
    pub fn last_week(&self) -> Option<NaiveDate> {
        self.observations.last().map(|o| o.week)
    }

    /// Stock on hand reported by the most recent observation
    pub fn latest_stock(&self) -> Option<f64> {
        self.observations.last().map(|o| o.stock_on_hand)
    }

    /// Check if the series is empty
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Get the number of weeks in the series
    pub fn len(&self) -> usize {
        self.observations.len()
    }
}

/// Supplier of observation history, implemented by the external store
pub trait ObservationSource {
    /// Ordered weekly history for one entity
    fn weekly_series(&self, entity_id: &str) -> Result<WeeklySeries>;
}

/// Observation store held in memory, keyed by entity
#[derive(Debug, Clone, Default)]
pub struct InMemoryObservationStore {
    by_entity: BTreeMap<String, Vec<Observation>>,
}

impl InMemoryObservationStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an observation; a second record for the same entity and week is rejected
    pub fn insert(&mut self, observation: Observation) -> Result<()> {
        let entries = self
            .by_entity
            .entry(observation.entity_id.clone())
            .or_default();

        match entries.binary_search_by_key(&observation.week, |o| o.week) {
            Ok(_) => Err(ForecastError::InvalidData(format!(
                "Duplicate observation for '{}' in week {}",
                observation.entity_id, observation.week
            ))),
            Err(pos) => {
                entries.insert(pos, observation);
                Ok(())
            }
        }
    }

    /// Append several observations
    pub fn extend<I: IntoIterator<Item = Observation>>(&mut self, observations: I) -> Result<()> {
        for observation in observations {
            self.insert(observation)?;
        }
        Ok(())
    }

    /// Entity keys present in the store
    pub fn entity_ids(&self) -> impl Iterator<Item = &str> {
        self.by_entity.keys().map(String::as_str)
    }
}

impl ObservationSource for InMemoryObservationStore {
    fn weekly_series(&self, entity_id: &str) -> Result<WeeklySeries> {
        let observations = self.by_entity.get(entity_id).cloned().unwrap_or_default();
        WeeklySeries::new(entity_id, observations)
    }
}

/// Data loader for observation history
#[derive(Debug)]
pub struct ObservationLoader;

impl ObservationLoader {
    /// Load observations from a CSV file
    ///
    /// The expected header is `entity_id,week,units_sold,stock_on_hand`,
    /// with weeks formatted as `YYYY-MM-DD`.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<InMemoryObservationStore> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Load observations from any CSV reader
    pub fn from_reader<R: Read>(reader: R) -> Result<InMemoryObservationStore> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut store = InMemoryObservationStore::new();
        for record in csv_reader.deserialize::<Observation>() {
            store.insert(record?)?;
        }

        Ok(store)
    }
}
