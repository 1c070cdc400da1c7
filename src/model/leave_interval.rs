use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use utoipa::ToSchema;

use crate::model::leave_request::LeaveStatus;

/// Status a calendar day can be marked with.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum IntervalStatus {
    Approved,
    Pending,
    Rejected,
    Cancelled,
}

impl From<LeaveStatus> for IntervalStatus {
    fn from(status: LeaveStatus) -> Self {
        match status {
            LeaveStatus::Open => IntervalStatus::Pending,
            LeaveStatus::Approved => IntervalStatus::Approved,
            LeaveStatus::Rejected => IntervalStatus::Rejected,
        }
    }
}

/// A status-tagged date range, used only for calendar display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LeaveInterval {
    #[schema(example = "2024-03-01", format = "date", value_type = String)]
    pub start: NaiveDate,
    #[schema(example = "2024-03-03", format = "date", value_type = String)]
    pub end: NaiveDate,
    pub status: IntervalStatus,
}

impl LeaveInterval {
    pub fn new(start: NaiveDate, end: NaiveDate, status: IntervalStatus) -> Self {
        Self { start, end, status }
    }
}
