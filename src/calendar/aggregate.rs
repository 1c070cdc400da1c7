use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use utoipa::ToSchema;

use super::expand::expand;
use crate::error::InvalidRangeError;
use crate::model::leave_interval::{IntervalStatus, LeaveInterval};

/// Days to mark on the calendar, bucketed by status.
///
/// Every status is always present as a key, possibly with no days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object, example = json!({
    "approved": ["2024-03-01", "2024-03-02"],
    "pending": ["2024-03-05"],
    "rejected": [],
    "cancelled": []
}))]
pub struct DayStatusMap(BTreeMap<IntervalStatus, BTreeSet<NaiveDate>>);

impl DayStatusMap {
    pub fn new() -> Self {
        Self(IntervalStatus::iter().map(|s| (s, BTreeSet::new())).collect())
    }

    pub fn days(&self, status: IntervalStatus) -> &BTreeSet<NaiveDate> {
        static NONE: BTreeSet<NaiveDate> = BTreeSet::new();
        self.0.get(&status).unwrap_or(&NONE)
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(BTreeSet::is_empty)
    }

    fn insert_all(&mut self, status: IntervalStatus, days: Vec<NaiveDate>) {
        self.0.entry(status).or_default().extend(days);
    }
}

impl Default for DayStatusMap {
    fn default() -> Self {
        Self::new()
    }
}

/// Fold leave intervals into a [`DayStatusMap`].
///
/// Fails fast: the first interval with `end < start` aborts the whole batch
/// and the error carries that interval's position in `intervals`.
pub fn aggregate<'a, I>(intervals: I) -> Result<DayStatusMap, InvalidRangeError>
where
    I: IntoIterator<Item = &'a LeaveInterval>,
{
    aggregate_within(intervals, None, None)
}

/// [`aggregate`] restricted to the display window `[from, to]`; an open bound
/// keeps everything on that side.
///
/// Each interval is cut to the window before it is expanded, so the work is
/// bounded by the days shown rather than by the length of the leave. Every
/// interval is still checked, including those outside the window.
pub fn aggregate_within<'a, I>(
    intervals: I,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<DayStatusMap, InvalidRangeError>
where
    I: IntoIterator<Item = &'a LeaveInterval>,
{
    let mut map = DayStatusMap::new();
    for (index, interval) in intervals.into_iter().enumerate() {
        if interval.end < interval.start {
            return Err(InvalidRangeError::new(interval.start, interval.end).at(index));
        }
        let start = from.map_or(interval.start, |f| f.max(interval.start));
        let end = to.map_or(interval.end, |t| t.min(interval.end));
        if end < start {
            continue;
        }
        let days = expand(start, end).map_err(|e| e.at(index))?;
        map.insert_all(interval.status, days);
    }
    Ok(map)
}
