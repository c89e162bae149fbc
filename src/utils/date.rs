use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Wire format for dates sent upstream and shown to the presentation layer.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a calendar date, dropping any time-of-day component.
///
/// Accepts `2025-07-18`, `2025-07-18T09:30:00` and RFC 3339 timestamps
/// (`2025-07-18T09:30:00+07:00`). The date is taken as written, never shifted
/// across a timezone boundary.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(d) = NaiveDate::parse_from_str(value, DATE_FORMAT) {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local().date());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }

    None
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
