use crate::dates;
use crate::error::{Result, WardrobeError};
use crate::model::WearRecord;
use crate::storage::{KvHost, Storage};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const STORAGE_KEY: &str = "calendar-store";

/// Aggregate over one month of wear records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthlyStats {
    /// Number of records in the month.
    pub total_wears: usize,
    /// Number of distinct dates with at least one record.
    pub unique_dates: usize,
    /// Number of distinct clothing ids referenced across all records.
    pub clothing_count: usize,
}

/// Fields of a wear record that [`CalendarStore::update`] can patch.
#[derive(Debug, Clone, Default)]
pub struct WearUpdate {
    pub date: Option<NaiveDate>,
    pub outfit_id: Option<String>,
    pub clothing_ids: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CalendarSnapshot {
    records: Vec<WearRecord>,
}

#[derive(Debug)]
pub struct CalendarStore {
    records: Vec<WearRecord>,
    pub current_date: NaiveDate,
    is_loading: bool,
}

impl Default for CalendarStore {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            current_date: dates::today(),
            is_loading: false,
        }
    }
}

impl CalendarStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[WearRecord] {
        &self.records
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// All records on `date`, in insertion order. Possibly empty.
    pub fn get_by_date(&self, date: NaiveDate) -> Vec<&WearRecord> {
        self.records.iter().filter(|r| r.date == date).collect()
    }

    /// Aggregate counts over every record falling in `year`-`month`.
    pub fn monthly_stats(&self, year: i32, month: u32) -> MonthlyStats {
        let month_records: Vec<&WearRecord> = self
            .records
            .iter()
            .filter(|r| r.date.year() == year && r.date.month() == month)
            .collect();

        let unique_dates: HashSet<NaiveDate> = month_records.iter().map(|r| r.date).collect();
        let clothing: HashSet<&str> = month_records
            .iter()
            .flat_map(|r| r.clothing_ids.iter().map(String::as_str))
            .collect();

        MonthlyStats {
            total_wears: month_records.len(),
            unique_dates: unique_dates.len(),
            clothing_count: clothing.len(),
        }
    }

    pub fn replace_all(&mut self, records: Vec<WearRecord>) {
        self.records = records;
    }

    pub fn add(&mut self, record: WearRecord) {
        self.records.push(record);
    }

    /// Merge `update` into the first record matching `id`.
    /// `false` when no record matches.
    pub fn update(&mut self, id: &str, update: WearUpdate) -> bool {
        let Some(record) = self.records.iter_mut().find(|r| r.id == id) else {
            return false;
        };
        if let Some(date) = update.date {
            record.date = date;
        }
        if let Some(outfit_id) = update.outfit_id {
            record.outfit_id = Some(outfit_id);
        }
        if let Some(clothing_ids) = update.clothing_ids {
            record.clothing_ids = clothing_ids;
        }
        true
    }

    pub fn delete(&mut self, id: &str) -> bool {
        match self.records.iter().position(|r| r.id == id) {
            Some(index) => {
                self.records.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn load<H: KvHost>(&mut self, storage: &Storage<H>) {
        self.is_loading = true;
        match storage.get::<CalendarSnapshot>(STORAGE_KEY) {
            Ok(snapshot) => self.records = snapshot.records,
            Err(WardrobeError::NotFound(_)) => {}
            Err(e) => tracing::warn!(error = %e, "failed to load wear records from storage"),
        }
        self.is_loading = false;
    }

    pub fn save<H: KvHost>(&self, storage: &Storage<H>) -> Result<()> {
        storage.set(
            STORAGE_KEY,
            &CalendarSnapshot {
                records: self.records.clone(),
            },
        )
    }
}
