use chrono::NaiveDateTime;

/// Text layout of the `ScanTime` column. Lexical order matches time order.
pub const SCAN_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One verified or rejected scan, as stored in `ScanRecords`.
///
/// Rows are append-only: once written they are only ever removed whole.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScanRecord {
    /// `Id`, assigned by the store. Ignored on insert.
    pub id: i64,
    /// `STT`, the operator-visible ordinal (`start value + rows so far`).
    pub sequence_number: i64,
    /// `Barcode`, kept exactly as scanned.
    pub barcode: String,
    /// `NgayGio`, the capture time as shown to the operator.
    pub timestamp_display: String,
    /// `KetQua`: `OK`, `Trùng barcode` or `Sai model`.
    pub result: String,
    /// `Ca`, the shift label. Empty when unset.
    pub shift: String,
    /// `ScanTime`. `None` on insert means "now".
    pub scan_time: Option<NaiveDateTime>,
}

pub fn format_scan_time(time: &NaiveDateTime) -> String {
    time.format(SCAN_TIME_FORMAT).to_string()
}

pub fn parse_scan_time(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, SCAN_TIME_FORMAT).ok()
}
