use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{LeaveFilter, LeaveRepository};
use crate::model::leave_request::{LeaveRequest, LeaveStatus};
use crate::model::pagination::{LeavePage, PageRequest, Pagination};

/// Process-local store, used for tests and `LEAVE_STORE=memory`.
#[derive(Debug, Default)]
pub struct MemoryLeaveRepository {
    leaves: RwLock<HashMap<String, LeaveRequest>>,
}

impl MemoryLeaveRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn matching(&self, filter: &LeaveFilter) -> Vec<LeaveRequest> {
        let mut found: Vec<LeaveRequest> = self
            .leaves
            .read()
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        found
    }
}

#[async_trait]
impl LeaveRepository for MemoryLeaveRepository {
    async fn insert(&self, request: &LeaveRequest) -> anyhow::Result<()> {
        let mut leaves = self.leaves.write();
        if leaves.contains_key(&request.id) {
            anyhow::bail!("duplicate leave id {}", request.id);
        }
        leaves.insert(request.id.clone(), request.clone());
        Ok(())
    }

    async fn get(&self, leave_id: &str) -> anyhow::Result<Option<LeaveRequest>> {
        Ok(self.leaves.read().get(leave_id).cloned())
    }

    async fn update_if_open(&self, request: &LeaveRequest) -> anyhow::Result<bool> {
        let mut leaves = self.leaves.write();
        match leaves.get_mut(&request.id) {
            Some(stored) if stored.status == LeaveStatus::Open => {
                *stored = request.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list(&self, filter: &LeaveFilter, page: PageRequest) -> anyhow::Result<LeavePage> {
        let found = self.matching(filter);
        let pagination = Pagination::new(page, found.len() as u64);
        let leaves = found
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.page_size as usize)
            .collect();
        Ok(LeavePage { leaves, pagination })
    }

    async fn list_all(&self, filter: &LeaveFilter) -> anyhow::Result<Vec<LeaveRequest>> {
        Ok(self.matching(filter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, Utc};

    fn request(id: &str, employee: &str, age_mins: i64) -> LeaveRequest {
        let at = Utc::now() - Duration::minutes(age_mins);
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        LeaveRequest {
            id: id.into(),
            employee_id: employee.into(),
            leave_type: "Vacation".into(),
            from_date: day,
            to_date: day,
            is_half_day: false,
            reason: "rest".into(),
            status: LeaveStatus::Open,
            approver_id: None,
            rejection_reason: None,
            created_at: at,
            updated_at: at,
            decided_at: None,
        }
    }

    #[actix_web::test]
    async fn insert_rejects_duplicate_ids() {
        let repo = MemoryLeaveRepository::new();
        repo.insert(&request("L1", "E1", 0)).await.unwrap();
        assert!(repo.insert(&request("L1", "E2", 0)).await.is_err());
        assert_eq!(repo.get("L1").await.unwrap().unwrap().employee_id, "E1");
    }

    #[actix_web::test]
    async fn update_only_while_open() {
        let repo = MemoryLeaveRepository::new();
        let mut leave = request("L1", "E1", 0);
        repo.insert(&leave).await.unwrap();

        leave.status = LeaveStatus::Approved;
        assert!(repo.update_if_open(&leave).await.unwrap());

        leave.status = LeaveStatus::Rejected;
        assert!(!repo.update_if_open(&leave).await.unwrap());
        assert_eq!(repo.get("L1").await.unwrap().unwrap().status, LeaveStatus::Approved);

        assert!(!repo.update_if_open(&request("missing", "E1", 0)).await.unwrap());
    }

    #[actix_web::test]
    async fn list_filters_and_pages_newest_first() {
        let repo = MemoryLeaveRepository::new();
        for (i, employee) in ["E1", "E2", "E1", "E1"].iter().enumerate() {
            repo.insert(&request(&format!("L{i}"), employee, 10 - i as i64)).await.unwrap();
        }

        let filter = LeaveFilter {
            employee_id: Some("E1".into()),
            status: None,
        };
        let page = repo.list(&filter, PageRequest::new(Some(1), Some(2))).await.unwrap();
        let ids: Vec<_> = page.leaves.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, ["L3", "L2"]);
        assert_eq!(page.pagination.total, 3);
        assert!(page.pagination.has_next);

        let second = repo.list(&filter, PageRequest::new(Some(2), Some(2))).await.unwrap();
        assert_eq!(second.leaves.len(), 1);
        assert_eq!(second.leaves[0].id, "L0");

        let approved = LeaveFilter {
            employee_id: None,
            status: Some(LeaveStatus::Approved),
        };
        assert!(repo.list_all(&approved).await.unwrap().is_empty());
    }
}
