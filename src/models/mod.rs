use chrono::NaiveDateTime;

pub mod booking;
pub mod interest;
pub mod notification;
pub mod section;
pub mod settings;
pub mod subscription;
pub mod user;

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Timestamps are stored as zero-padded UTC text so SQL string comparison
/// matches chronological order.
pub fn format_ts(ts: &NaiveDateTime) -> String {
    ts.format(TS_FORMAT).to_string()
}

pub fn parse_ts(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, TS_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
}

/// Read a timestamp column. Text that does not parse is a conversion error,
/// never a silent epoch.
pub fn ts_column(row: &rusqlite::Row, column: &str) -> rusqlite::Result<NaiveDateTime> {
    let raw: String = row.get(column)?;
    parse_ts(&raw).ok_or_else(|| {
        let idx = row.as_ref().column_index(column).unwrap_or_default();
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            format!("invalid timestamp '{}' in {}", raw, column).into(),
        )
    })
}
