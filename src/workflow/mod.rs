//! Leave request lifecycle.
//!
//! ```text
//! submit ──▶ OPEN ──▶ Approved   (terminal)
//!              │
//!              └────▶ Rejected   (terminal, rejection reason required)
//! ```
//!
//! Nothing leaves a terminal state. Status updates for one request are
//! single-flight: a second update while the first is still running fails
//! with [`LeaveError::InFlight`].

mod payload;

use std::collections::HashSet;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use futures::FutureExt;
use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

pub use payload::{LeaveCommand, StatusUpdate, SubmitLeave, parse_day};

use crate::calendar::{DayStatusMap, aggregate_within};
use crate::error::LeaveError;
use crate::model::leave_interval::LeaveInterval;
use crate::model::leave_request::{Decision, LeaveRequest, LeaveStatus};
use crate::model::pagination::{LeavePage, PageRequest};
use crate::repository::{LeaveFilter, LeaveRepository};

/// Longest leave, in calendar days, accepted unless configured otherwise.
pub const DEFAULT_MAX_LEAVE_DAYS: u32 = 365;

pub struct LeaveWorkflow {
    repo: Arc<dyn LeaveRepository>,
    leave_types: Vec<String>,
    max_leave_days: u32,
    in_flight: Mutex<HashSet<String>>,
}

/// Holds a leave id in the in-flight set until dropped.
struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<String>>,
    leave_id: String,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set.lock().remove(&self.leave_id);
    }
}

/// Run a store call, turning its failures (panics included) into
/// [`LeaveError::Collaborator`].
async fn guarded<T, F>(op: &'static str, fut: F) -> Result<T, LeaveError>
where
    F: Future<Output = anyhow::Result<T>>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            tracing::error!(error = %e, op, "Leave store call failed");
            Err(LeaveError::from(e))
        }
        Err(_) => {
            tracing::error!(op, "Leave store call panicked");
            Err(LeaveError::Collaborator(format!("{op} failed unexpectedly")))
        }
    }
}

impl LeaveWorkflow {
    pub fn new(repo: Arc<dyn LeaveRepository>, leave_types: Vec<String>) -> Self {
        Self {
            repo,
            leave_types,
            max_leave_days: DEFAULT_MAX_LEAVE_DAYS,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn with_max_leave_days(mut self, max_leave_days: u32) -> Self {
        self.max_leave_days = max_leave_days;
        self
    }

    pub fn leave_types(&self) -> &[String] {
        &self.leave_types
    }

    /// Validate and store a new `OPEN` request.
    #[instrument(name = "leave_submit", skip(self, payload), fields(employee_id = %payload.employee_id))]
    pub async fn submit(&self, payload: &SubmitLeave) -> Result<LeaveRequest, LeaveError> {
        let leave = payload.validate(&self.leave_types, self.max_leave_days).inspect_err(|e| {
            info!(error = %e, "Leave submission rejected");
        })?;

        let now = Utc::now();
        let request = LeaveRequest {
            id: Uuid::new_v4().to_string(),
            employee_id: leave.employee_id,
            leave_type: leave.leave_type,
            from_date: leave.from_date,
            to_date: leave.to_date,
            is_half_day: leave.is_half_day,
            reason: leave.reason,
            status: LeaveStatus::Open,
            approver_id: None,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
            decided_at: None,
        };

        guarded("insert", self.repo.insert(&request)).await?;
        info!(leave_id = %request.id, days = request.days(), "Leave request submitted");
        Ok(request)
    }

    /// Move an `OPEN` request to `Approved` or `Rejected`.
    #[instrument(
        name = "leave_update_status",
        skip(self, update),
        fields(leave_id = %update.leave_id, status = %update.status)
    )]
    pub async fn update_status(&self, update: &StatusUpdate) -> Result<LeaveRequest, LeaveError> {
        update.validate()?;
        let _guard = self.begin_update(&update.leave_id)?;

        let current = guarded("get", self.repo.get(&update.leave_id))
            .await?
            .ok_or_else(|| LeaveError::NotFound {
                leave_id: update.leave_id.clone(),
            })?;
        if current.status.is_terminal() {
            warn!(current = %current.status, "Leave request already decided");
            return Err(LeaveError::InvalidTransition {
                leave_id: current.id,
                status: current.status,
            });
        }

        let now = Utc::now();
        let decided = LeaveRequest {
            status: update.status.into(),
            approver_id: Some(update.approver_id.trim().to_string()),
            rejection_reason: match update.status {
                Decision::Rejected => update.rejection_reason.as_deref().map(|r| r.trim().to_string()),
                Decision::Approved => None,
            },
            updated_at: now,
            decided_at: Some(now),
            ..current
        };

        if !guarded("update", self.repo.update_if_open(&decided)).await? {
            // decided elsewhere between our read and write
            return Err(match guarded("get", self.repo.get(&decided.id)).await? {
                Some(stored) => LeaveError::InvalidTransition {
                    leave_id: stored.id,
                    status: stored.status,
                },
                None => LeaveError::NotFound {
                    leave_id: decided.id,
                },
            });
        }

        info!("Leave request decided");
        Ok(decided)
    }

    /// Dispatch a tagged command to [`submit`](Self::submit) or
    /// [`update_status`](Self::update_status).
    pub async fn execute(&self, command: &LeaveCommand) -> Result<LeaveRequest, LeaveError> {
        match command {
            LeaveCommand::Submit(payload) => self.submit(payload).await,
            LeaveCommand::UpdateStatus(update) => self.update_status(update).await,
        }
    }

    pub async fn get(&self, leave_id: &str) -> Result<LeaveRequest, LeaveError> {
        guarded("get", self.repo.get(leave_id))
            .await?
            .ok_or_else(|| LeaveError::NotFound {
                leave_id: leave_id.to_string(),
            })
    }

    pub async fn list(&self, filter: &LeaveFilter, page: PageRequest) -> Result<LeavePage, LeaveError> {
        guarded("list", self.repo.list(filter, page)).await
    }

    /// Day-status map over every matching request, limited to `[from, to]`
    /// when either bound is given.
    pub async fn calendar(
        &self,
        filter: &LeaveFilter,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<DayStatusMap, LeaveError> {
        let requests = guarded("list_all", self.repo.list_all(filter)).await?;
        let intervals: Vec<LeaveInterval> = requests.iter().map(LeaveRequest::interval).collect();
        let map = aggregate_within(&intervals, from, to).inspect_err(|e| {
            if let Some(bad) = e.index.and_then(|i| requests.get(i)) {
                warn!(leave_id = %bad.id, error = %e, "Stored leave has an inverted range");
            }
        })?;
        if map.is_empty() {
            debug!("No leave days to mark");
        }
        Ok(map)
    }

    fn begin_update(&self, leave_id: &str) -> Result<InFlightGuard<'_>, LeaveError> {
        if !self.in_flight.lock().insert(leave_id.to_string()) {
            return Err(LeaveError::InFlight {
                leave_id: leave_id.to_string(),
            });
        }
        Ok(InFlightGuard {
            set: &self.in_flight,
            leave_id: leave_id.to_string(),
        })
    }
}
