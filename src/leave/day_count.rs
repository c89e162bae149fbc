use chrono::NaiveDate;

/// Number of calendar days covered by a request, both endpoints included.
///
/// Order does not matter. Returns 0 when either date is missing.
pub fn day_count(start: Option<NaiveDate>, end: Option<NaiveDate>) -> u32 {
    match (start, end) {
        (Some(start), Some(end)) => {
            // chrono's date range keeps this well inside u32
            (end - start).num_days().unsigned_abs() as u32 + 1
        }
        _ => 0,
    }
}
