use chrono::{NaiveDate, NaiveDateTime};

use crate::error::InvalidRangeError;

/// Inclusive, ascending list of calendar days from `start` to `end`.
pub fn expand(start: NaiveDate, end: NaiveDate) -> Result<Vec<NaiveDate>, InvalidRangeError> {
    if end < start {
        return Err(InvalidRangeError::new(start, end));
    }

    let mut days = Vec::with_capacity((end - start).num_days() as usize + 1);
    let mut current = start;
    while current <= end {
        days.push(current);
        match current.succ_opt() {
            Some(next) => current = next,
            None => break,
        }
    }
    Ok(days)
}

/// Like [`expand`], for values carrying a time of day. The time is dropped
/// first so a range ending at 09:00 still includes its last day.
pub fn expand_datetimes(
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<Vec<NaiveDate>, InvalidRangeError> {
    expand(start.date(), end.date())
}
