use super::models::ScanRecord;
use super::queries::month_bounds;
use super::sqlite::Database;
use crate::config::AppConfig;
use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Durable log of classified scans.
///
/// Every operation opens its own connection and never returns an error:
/// failures are logged and the caller gets an empty list, `0`, `false` or
/// `None`. Once [`ScanStore::initialize`] has failed the store stays
/// degraded and all later calls short-circuit to those defaults.
#[derive(Debug)]
pub struct ScanStore {
    path: PathBuf,
    degraded: bool,
}

impl ScanStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            degraded: false,
        }
    }

    /// Store at the configured location, initialized.
    pub fn open_default(config: &AppConfig) -> Self {
        let mut store = Self::new(config.database_path());
        store.initialize();
        store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_available(&self) -> bool {
        !self.degraded
    }

    /// Create the parent directory, the table and its indexes. Safe to call
    /// on every start. A store that failed once stays degraded.
    pub fn initialize(&mut self) {
        if self.degraded {
            debug!("Scan store at {} is degraded, not re-initializing", self.path.display());
            return;
        }
        if let Err(e) = self.try_initialize() {
            error!(
                "Scan store at {} could not be initialized, continuing without it: {}",
                self.path.display(),
                e
            );
            self.degraded = true;
            return;
        }
        info!("Scan store ready at {}", self.path.display());
    }

    fn try_initialize(&self) -> Result<(), crate::Error> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Database::open_and_migrate(&self.path)?;
        Ok(())
    }

    fn with_db<T: Default>(
        &self,
        operation: &str,
        f: impl FnOnce(&Database) -> rusqlite::Result<T>,
    ) -> T {
        if self.degraded {
            debug!("Scan store degraded, skipping {}", operation);
            return T::default();
        }
        match Database::open(&self.path).and_then(|db| f(&db)) {
            Ok(value) => value,
            Err(e) => {
                error!("Scan store {} failed: {}", operation, e);
                T::default()
            }
        }
    }

    /// Append one record. Returns the assigned id.
    pub fn save(&self, record: &ScanRecord) -> Option<i64> {
        self.with_db("save", |db| db.insert_record(record).map(Some))
    }

    pub fn get_by_id(&self, id: i64) -> Option<ScanRecord> {
        self.with_db("get_by_id", |db| db.record_by_id(id))
    }

    /// Up to `limit` records, most recently inserted first.
    pub fn get_recent(&self, limit: usize) -> Vec<ScanRecord> {
        self.with_db("get_recent", |db| db.recent_records(limit))
    }

    /// Records captured on any day in `[from, to]`, most recently inserted first.
    pub fn get_by_date_range(&self, from: NaiveDate, to: NaiveDate, limit: usize) -> Vec<ScanRecord> {
        self.with_db("get_by_date_range", |db| {
            db.records_by_date_range(from, to, limit)
        })
    }

    /// Records captured in the given calendar month, newest capture first.
    pub fn get_by_month(&self, year: i32, month: u32, limit: usize) -> Vec<ScanRecord> {
        let Some((start, end)) = month_bounds(year, month) else {
            warn!("Ignoring month query for invalid month {}-{}", year, month);
            return Vec::new();
        };
        self.with_db("get_by_month", |db| db.records_between(&start, &end, limit))
    }

    pub fn search_by_barcode(&self, text: &str, limit: usize) -> Vec<ScanRecord> {
        self.with_db("search_by_barcode", |db| db.search_records(text, limit))
    }

    pub fn count(&self) -> i64 {
        self.with_db("count", |db| db.count_records())
    }

    /// Remove everything captured more than `days_to_keep` days ago.
    pub fn delete_old_records(&self, days_to_keep: u32) -> usize {
        let cutoff = Duration::try_days(i64::from(days_to_keep))
            .and_then(|window| Local::now().naive_local().checked_sub_signed(window));
        let Some(cutoff) = cutoff else {
            warn!(
                "Retention window of {} days reaches past the earliest representable date, nothing to delete",
                days_to_keep
            );
            return 0;
        };
        let deleted = self.delete_records_before(&cutoff);
        info!("Retention: removed {} records older than {} days", deleted, days_to_keep);
        deleted
    }

    pub fn delete_records_before(&self, cutoff: &NaiveDateTime) -> usize {
        self.with_db("delete_records_before", |db| db.delete_records_before(cutoff))
    }

    /// Delete the most recently captured record matching the natural key.
    pub fn delete_by_natural_key(&self, barcode: &str, timestamp_display: &str, result: &str) -> bool {
        let deleted = self.with_db("delete_by_natural_key", |db| {
            db.delete_newest_matching(barcode, timestamp_display, result)
        });
        if deleted {
            info!("Deleted scan record {} / {} / {}", barcode, timestamp_display, result);
        }
        deleted
    }
}
