//! Storage boundary for leave requests.
//!
//! The workflow only talks to [`LeaveRepository`]; which implementation backs
//! it is chosen from configuration at startup.

use async_trait::async_trait;

use crate::model::leave_request::{LeaveRequest, LeaveStatus};
use crate::model::pagination::{LeavePage, PageRequest};

mod memory;
mod mysql;

pub use memory::MemoryLeaveRepository;
pub use mysql::MySqlLeaveRepository;

/// Listing filter; `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeaveFilter {
    pub employee_id: Option<String>,
    pub status: Option<LeaveStatus>,
}

impl LeaveFilter {
    pub fn matches(&self, request: &LeaveRequest) -> bool {
        self.employee_id
            .as_deref()
            .is_none_or(|id| request.employee_id == id)
            && self.status.is_none_or(|s| request.status == s)
    }
}

#[async_trait]
pub trait LeaveRepository: Send + Sync {
    /// Store a newly submitted request.
    async fn insert(&self, request: &LeaveRequest) -> anyhow::Result<()>;

    /// Fetch one request by id.
    async fn get(&self, leave_id: &str) -> anyhow::Result<Option<LeaveRequest>>;

    /// Overwrite a request only if the stored copy is still `OPEN`.
    ///
    /// Returns `false` when nothing was written (missing or already decided).
    async fn update_if_open(&self, request: &LeaveRequest) -> anyhow::Result<bool>;

    /// One page of matching requests, newest first.
    async fn list(&self, filter: &LeaveFilter, page: PageRequest) -> anyhow::Result<LeavePage>;

    /// Every matching request, newest first.
    async fn list_all(&self, filter: &LeaveFilter) -> anyhow::Result<Vec<LeaveRequest>>;
}
