use barcheck_core::ScanRecord;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

const HEADER: [&str; 5] = ["STT", "Barcode", "NgayGio", "KetQua", "Ca"];

pub fn default_export_path(year: i32, month: u32) -> PathBuf {
    PathBuf::from(format!("scans_{}_{:02}.csv", year, month))
}

pub fn write_records<W: io::Write>(writer: W, records: &[ScanRecord]) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER)?;
    for record in records {
        wtr.write_record([
            record.sequence_number.to_string().as_str(),
            record.barcode.as_str(),
            record.timestamp_display.as_str(),
            record.result.as_str(),
            record.shift.as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write `records` to a CSV file, oldest first.
pub fn export_to_file(path: &Path, records: &[ScanRecord]) -> Result<usize, csv::Error> {
    let mut ordered = records.to_vec();
    ordered.reverse();
    let file = std::fs::File::create(path)?;
    write_records(file, &ordered)?;
    info!("Exported {} records to {}", ordered.len(), path.display());
    Ok(ordered.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(stt: i64, barcode: &str, result: &str) -> ScanRecord {
        ScanRecord {
            id: stt,
            sequence_number: stt,
            barcode: barcode.to_string(),
            timestamp_display: "01/03/2024 08:00:00".to_string(),
            result: result.to_string(),
            shift: "Ca 1".to_string(),
            scan_time: None,
        }
    }

    #[test]
    fn test_default_export_path_pads_month() {
        assert_eq!(default_export_path(2024, 3), PathBuf::from("scans_2024_03.csv"));
    }

    #[test]
    fn test_write_records_quotes_fields() {
        let mut out = Vec::new();
        write_records(&mut out, &[record(1, "A,1", "OK")]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "STT,Barcode,NgayGio,KetQua,Ca\n1,\"A,1\",01/03/2024 08:00:00,OK,Ca 1\n"
        );
    }

    #[test]
    fn test_export_to_file_writes_oldest_first() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("march.csv");
        let newest_first = vec![record(2, "B", "Sai model"), record(1, "A", "OK")];

        assert_eq!(export_to_file(&path, &newest_first).unwrap(), 2);
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("1,A,"));
        assert!(lines[2].starts_with("2,B,"));
    }
}
