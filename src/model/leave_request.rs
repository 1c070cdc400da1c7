use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::model::leave_interval::LeaveInterval;

/// Lifecycle of a leave request. `OPEN` is the only non-terminal state.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[strum(ascii_case_insensitive)]
pub enum LeaveStatus {
    #[serde(rename = "OPEN", alias = "open", alias = "Open")]
    #[strum(serialize = "OPEN")]
    Open,
    #[serde(alias = "approved")]
    Approved,
    #[serde(alias = "rejected")]
    Rejected,
}

impl LeaveStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LeaveStatus::Open)
    }
}

/// Target of a status update; only terminal states can be requested.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[strum(ascii_case_insensitive)]
pub enum Decision {
    #[serde(alias = "approved")]
    Approved,
    #[serde(alias = "rejected")]
    Rejected,
}

impl From<Decision> for LeaveStatus {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Approved => LeaveStatus::Approved,
            Decision::Rejected => LeaveStatus::Rejected,
        }
    }
}

/// The authoritative record of a leave submission and its approval state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "id": "7b0c6d4e-1f43-4a8e-9a55-3c1f1c2d9e10",
    "employeeId": "E1",
    "leaveType": "Vacation",
    "fromDate": "2024-03-01",
    "toDate": "2024-03-03",
    "isHalfDay": false,
    "reason": "Family trip",
    "status": "OPEN",
    "approverId": null,
    "rejectionReason": null,
    "createdAt": "2024-02-20T09:00:00Z",
    "updatedAt": "2024-02-20T09:00:00Z",
    "decidedAt": null
}))]
pub struct LeaveRequest {
    pub id: String,
    pub employee_id: String,
    pub leave_type: String,
    #[schema(example = "2024-03-01", format = "date", value_type = String)]
    pub from_date: NaiveDate,
    #[schema(example = "2024-03-03", format = "date", value_type = String)]
    pub to_date: NaiveDate,
    pub is_half_day: bool,
    pub reason: String,
    pub status: LeaveStatus,
    pub approver_id: Option<String>,
    pub rejection_reason: Option<String>,
    #[schema(format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
    #[schema(format = "date-time", value_type = String)]
    pub updated_at: DateTime<Utc>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub decided_at: Option<DateTime<Utc>>,
}

impl LeaveRequest {
    /// Calendar days charged by this request; half-day requests count 0.5.
    pub fn days(&self) -> f64 {
        if self.is_half_day {
            return 0.5;
        }
        ((self.to_date - self.from_date).num_days() + 1) as f64
    }

    /// The calendar-display view of this request.
    pub fn interval(&self) -> LeaveInterval {
        LeaveInterval::new(self.from_date, self.to_date, self.status.into())
    }
}
