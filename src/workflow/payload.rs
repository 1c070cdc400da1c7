//! Request payloads accepted by the leave workflow.
//!
//! Payloads arrive loosely shaped (empty strings, unparsed dates) and are
//! checked here, at the boundary, before anything reaches the store.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{InvalidRangeError, LeaveError, ValidationError};
use crate::model::leave_request::Decision;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitLeave {
    #[serde(default)]
    #[schema(example = "E1")]
    pub employee_id: String,
    #[serde(rename = "type", alias = "leaveType", default)]
    #[schema(example = "Vacation")]
    pub leave_type: String,
    #[serde(alias = "fromDate", default)]
    #[schema(example = "2024-03-01", format = "date")]
    pub start_date: Option<String>,
    #[serde(alias = "toDate", default)]
    #[schema(example = "2024-03-03", format = "date")]
    pub end_date: Option<String>,
    #[serde(default)]
    pub is_half_day: bool,
    #[serde(default)]
    #[schema(example = "Family trip")]
    pub reason: String,
}

/// A submission that passed every check.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLeave {
    pub employee_id: String,
    pub leave_type: String,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub is_half_day: bool,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    #[serde(default)]
    pub leave_id: String,
    pub status: Decision,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    #[schema(example = "HR-7")]
    pub approver_id: String,
}

/// Operations the workflow accepts, tagged by `action`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum LeaveCommand {
    Submit(SubmitLeave),
    UpdateStatus(StatusUpdate),
}

/// Parse an ISO-8601 date or date-time into the calendar day it names.
pub fn parse_day(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

impl SubmitLeave {
    /// Check every field, reporting all bad ones at once.
    ///
    /// `leave_types` is the configured set; matching ignores case and the
    /// configured spelling is kept. A leave longer than `max_days` calendar
    /// days is reported against `endDate`.
    pub fn validate(&self, leave_types: &[String], max_days: u32) -> Result<NewLeave, LeaveError> {
        let mut bad = Vec::new();

        if blank(&self.employee_id) {
            bad.push("employeeId");
        }
        let leave_type = leave_types
            .iter()
            .find(|t| t.eq_ignore_ascii_case(self.leave_type.trim()));
        if leave_type.is_none() {
            bad.push("type");
        }
        let from_date = self.start_date.as_deref().and_then(parse_day);
        if from_date.is_none() {
            bad.push("startDate");
        }
        let to_date = self.end_date.as_deref().and_then(parse_day);
        if to_date.is_none() {
            bad.push("endDate");
        }
        if blank(&self.reason) {
            bad.push("reason");
        }

        let (Some(leave_type), Some(from_date), Some(to_date), true) =
            (leave_type, from_date, to_date, bad.is_empty())
        else {
            return Err(ValidationError::new(bad).into());
        };

        if to_date < from_date {
            return Err(InvalidRangeError::new(from_date, to_date).into());
        }
        if (to_date - from_date).num_days() >= i64::from(max_days) {
            return Err(ValidationError::new(["endDate"]).into());
        }
        if self.is_half_day && from_date != to_date {
            return Err(ValidationError::new(["isHalfDay"]).into());
        }

        Ok(NewLeave {
            employee_id: self.employee_id.trim().to_string(),
            leave_type: leave_type.clone(),
            from_date,
            to_date,
            is_half_day: self.is_half_day,
            reason: self.reason.trim().to_string(),
        })
    }
}

impl StatusUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut bad = Vec::new();
        if blank(&self.leave_id) {
            bad.push("leaveId");
        }
        if blank(&self.approver_id) {
            bad.push("approverId");
        }
        if self.status == Decision::Rejected
            && self.rejection_reason.as_deref().is_none_or(blank)
        {
            bad.push("rejectionReason");
        }

        if bad.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(bad))
        }
    }
}
