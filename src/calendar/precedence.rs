use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::aggregate::DayStatusMap;
use crate::model::leave_interval::IntervalStatus;

/// Display order used to pick one status per day.
///
/// Earlier entries win. Statuses left out of the order are never rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderPrecedence(Vec<IntervalStatus>);

impl RenderPrecedence {
    pub fn new(order: Vec<IntervalStatus>) -> Self {
        Self(order)
    }

    /// Winning status for `day`, if any rendered status covers it.
    pub fn status_for(&self, map: &DayStatusMap, day: &NaiveDate) -> Option<IntervalStatus> {
        self.0.iter().copied().find(|status| map.days(*status).contains(day))
    }

    /// One status per marked day.
    pub fn resolve(&self, map: &DayStatusMap) -> BTreeMap<NaiveDate, IntervalStatus> {
        let mut resolved = BTreeMap::new();
        // walk lowest priority first so winners overwrite
        for status in self.0.iter().rev() {
            for day in map.days(*status) {
                resolved.insert(*day, *status);
            }
        }
        resolved
    }
}

impl Default for RenderPrecedence {
    fn default() -> Self {
        Self(vec![
            IntervalStatus::Approved,
            IntervalStatus::Pending,
            IntervalStatus::Rejected,
        ])
    }
}
