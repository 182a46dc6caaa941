use super::models::{format_scan_time, parse_scan_time, ScanRecord};
use super::sqlite::Database;
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Result, Row};
use tracing::debug;

const RECORD_COLUMNS: &str = "Id, STT, Barcode, NgayGio, KetQua, Ca, ScanTime";

fn map_record(row: &Row<'_>) -> Result<ScanRecord> {
    let scan_time: String = row.get(6)?;
    Ok(ScanRecord {
        id: row.get(0)?,
        sequence_number: row.get(1)?,
        barcode: row.get(2)?,
        timestamp_display: row.get(3)?,
        result: row.get(4)?,
        shift: row.get(5)?,
        scan_time: parse_scan_time(&scan_time),
    })
}

/// First instant of `year-month` and of the month after it.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((start.and_hms_opt(0, 0, 0)?, next.and_hms_opt(0, 0, 0)?))
}

/// Escape LIKE wildcards so the search text matches literally.
fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

impl Database {
    fn query_records<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<ScanRecord>> {
        let mut stmt = self.connection().prepare(sql)?;
        let records = stmt
            .query_map(params, map_record)?
            .collect::<Result<Vec<_>>>()?;
        Ok(records)
    }

    // ── Insert ───────────────────────────────────────────────────

    pub fn insert_record(&self, record: &ScanRecord) -> Result<i64> {
        let scan_time = record.scan_time.as_ref().map(format_scan_time);
        self.connection().execute(
            "INSERT INTO ScanRecords (STT, Barcode, NgayGio, KetQua, Ca, ScanTime) \
             VALUES (?1, ?2, ?3, ?4, ?5, COALESCE(?6, datetime('now', 'localtime')))",
            params![
                record.sequence_number,
                record.barcode,
                record.timestamp_display,
                record.result,
                record.shift,
                scan_time,
            ],
        )?;
        let id = self.connection().last_insert_rowid();
        debug!("Inserted scan record {} ({} / {})", id, record.barcode, record.result);
        Ok(id)
    }

    // ── Reads ────────────────────────────────────────────────────

    pub fn record_by_id(&self, id: i64) -> Result<Option<ScanRecord>> {
        match self.connection().query_row(
            &format!("SELECT {} FROM ScanRecords WHERE Id = ?1", RECORD_COLUMNS),
            params![id],
            map_record,
        ) {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn recent_records(&self, limit: usize) -> Result<Vec<ScanRecord>> {
        self.query_records(
            &format!(
                "SELECT {} FROM ScanRecords ORDER BY Id DESC LIMIT ?1",
                RECORD_COLUMNS
            ),
            params![limit as i64],
        )
    }

    /// Records whose calendar date lies in `[from, to]`, newest id first.
    pub fn records_by_date_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        limit: usize,
    ) -> Result<Vec<ScanRecord>> {
        self.query_records(
            &format!(
                "SELECT {} FROM ScanRecords \
                 WHERE date(ScanTime) BETWEEN ?1 AND ?2 \
                 ORDER BY Id DESC LIMIT ?3",
                RECORD_COLUMNS
            ),
            params![
                from.format("%Y-%m-%d").to_string(),
                to.format("%Y-%m-%d").to_string(),
                limit as i64
            ],
        )
    }

    /// Records captured in `[start, end)`, newest capture first.
    pub fn records_between(
        &self,
        start: &NaiveDateTime,
        end: &NaiveDateTime,
        limit: usize,
    ) -> Result<Vec<ScanRecord>> {
        self.query_records(
            &format!(
                "SELECT {} FROM ScanRecords \
                 WHERE ScanTime >= ?1 AND ScanTime < ?2 \
                 ORDER BY ScanTime DESC, Id DESC LIMIT ?3",
                RECORD_COLUMNS
            ),
            params![format_scan_time(start), format_scan_time(end), limit as i64],
        )
    }

    /// Case-insensitive (ASCII) substring match on `Barcode`.
    pub fn search_records(&self, text: &str, limit: usize) -> Result<Vec<ScanRecord>> {
        self.query_records(
            &format!(
                "SELECT {} FROM ScanRecords \
                 WHERE Barcode LIKE ?1 ESCAPE '\\' \
                 ORDER BY ScanTime DESC, Id DESC LIMIT ?2",
                RECORD_COLUMNS
            ),
            params![like_pattern(text), limit as i64],
        )
    }

    pub fn count_records(&self) -> Result<i64> {
        self.connection()
            .query_row("SELECT COUNT(*) FROM ScanRecords", [], |row| row.get(0))
    }

    // ── Deletes ──────────────────────────────────────────────────

    pub fn delete_records_before(&self, cutoff: &NaiveDateTime) -> Result<usize> {
        let deleted = self.connection().execute(
            "DELETE FROM ScanRecords WHERE ScanTime < ?1",
            params![format_scan_time(cutoff)],
        )?;
        debug!("Deleted {} scan records older than {}", deleted, cutoff);
        Ok(deleted)
    }

    /// Delete the newest row carrying this `(Barcode, NgayGio, KetQua)` triple.
    /// Rows sharing the same `ScanTime` fall back to the highest `Id`.
    pub fn delete_newest_matching(
        &self,
        barcode: &str,
        timestamp_display: &str,
        result: &str,
    ) -> Result<bool> {
        let deleted = self.connection().execute(
            "DELETE FROM ScanRecords WHERE Id = ( \
                 SELECT Id FROM ScanRecords \
                 WHERE Barcode = ?1 AND NgayGio = ?2 AND KetQua = ?3 \
                 ORDER BY ScanTime DESC, Id DESC LIMIT 1)",
            params![barcode, timestamp_display, result],
        )?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_bounds_rolls_over_year() {
        let (start, end) = month_bounds(2024, 12).unwrap();
        assert_eq!(format_scan_time(&start), "2024-12-01 00:00:00");
        assert_eq!(format_scan_time(&end), "2025-01-01 00:00:00");
    }

    #[test]
    fn test_month_bounds_rejects_bad_month() {
        assert!(month_bounds(2024, 0).is_none());
        assert!(month_bounds(2024, 13).is_none());
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("AB"), "%AB%");
        assert_eq!(like_pattern("50%_x"), "%50\\%\\_x%");
    }
}
