use std::str::FromStr;

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{MySqlPool, prelude::FromRow};

use super::{LeaveFilter, LeaveRepository};
use crate::model::leave_request::{LeaveRequest, LeaveStatus};
use crate::model::pagination::{LeavePage, PageRequest, Pagination};

const SELECT_COLUMNS: &str = r#"
    SELECT id, employee_id, leave_type, from_date, to_date, is_half_day, reason,
           status, approver_id, rejection_reason, created_at, updated_at, decided_at
    FROM leave_requests
"#;

/// `leave_requests` table, see `sql/leave_requests.sql`.
#[derive(Clone)]
pub struct MySqlLeaveRepository {
    pool: MySqlPool,
}

impl MySqlLeaveRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct LeaveRow {
    id: String,
    employee_id: String,
    leave_type: String,
    from_date: NaiveDate,
    to_date: NaiveDate,
    is_half_day: bool,
    reason: String,
    status: String,
    approver_id: Option<String>,
    rejection_reason: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    decided_at: Option<DateTime<Utc>>,
}

impl TryFrom<LeaveRow> for LeaveRequest {
    type Error = anyhow::Error;

    fn try_from(row: LeaveRow) -> Result<Self, Self::Error> {
        let status = LeaveStatus::from_str(&row.status)
            .map_err(|_| anyhow!("unknown leave status {:?} on {}", row.status, row.id))?;
        Ok(LeaveRequest {
            id: row.id,
            employee_id: row.employee_id,
            leave_type: row.leave_type,
            from_date: row.from_date,
            to_date: row.to_date,
            is_half_day: row.is_half_day,
            reason: row.reason,
            status,
            approver_id: row.approver_id,
            rejection_reason: row.rejection_reason,
            created_at: row.created_at,
            updated_at: row.updated_at,
            decided_at: row.decided_at,
        })
    }
}

/// Builds the WHERE clause and its bind values, in placeholder order.
fn where_clause(filter: &LeaveFilter) -> (String, Vec<String>) {
    let mut where_sql = String::from(" WHERE 1=1");
    let mut args = Vec::new();

    if let Some(employee_id) = &filter.employee_id {
        where_sql.push_str(" AND employee_id = ?");
        args.push(employee_id.clone());
    }
    if let Some(status) = filter.status {
        where_sql.push_str(" AND status = ?");
        args.push(status.to_string());
    }

    (where_sql, args)
}

fn into_requests(rows: Vec<LeaveRow>) -> anyhow::Result<Vec<LeaveRequest>> {
    rows.into_iter().map(LeaveRequest::try_from).collect()
}

#[async_trait]
impl LeaveRepository for MySqlLeaveRepository {
    async fn insert(&self, request: &LeaveRequest) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO leave_requests
                (id, employee_id, leave_type, from_date, to_date, is_half_day, reason,
                 status, approver_id, rejection_reason, created_at, updated_at, decided_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&request.id)
        .bind(&request.employee_id)
        .bind(&request.leave_type)
        .bind(request.from_date)
        .bind(request.to_date)
        .bind(request.is_half_day)
        .bind(&request.reason)
        .bind(request.status.to_string())
        .bind(&request.approver_id)
        .bind(&request.rejection_reason)
        .bind(request.created_at)
        .bind(request.updated_at)
        .bind(request.decided_at)
        .execute(&self.pool)
        .await
        .context("insert leave request")?;
        Ok(())
    }

    async fn get(&self, leave_id: &str) -> anyhow::Result<Option<LeaveRequest>> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?");
        let row = sqlx::query_as::<_, LeaveRow>(&sql)
            .bind(leave_id)
            .fetch_optional(&self.pool)
            .await
            .context("fetch leave request")?;
        row.map(LeaveRequest::try_from).transpose()
    }

    async fn update_if_open(&self, request: &LeaveRequest) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE leave_requests
            SET status = ?, approver_id = ?, rejection_reason = ?,
                updated_at = ?, decided_at = ?
            WHERE id = ?
            AND status = ?
            "#,
        )
        .bind(request.status.to_string())
        .bind(&request.approver_id)
        .bind(&request.rejection_reason)
        .bind(request.updated_at)
        .bind(request.decided_at)
        .bind(&request.id)
        .bind(LeaveStatus::Open.to_string())
        .execute(&self.pool)
        .await
        .context("update leave status")?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, filter: &LeaveFilter, page: PageRequest) -> anyhow::Result<LeavePage> {
        let (where_sql, args) = where_clause(filter);

        let count_sql = format!("SELECT COUNT(*) FROM leave_requests{where_sql}");
        let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
        for arg in &args {
            count_q = count_q.bind(arg.as_str());
        }
        let total = count_q
            .fetch_one(&self.pool)
            .await
            .context("count leave requests")?;

        let data_sql = format!(
            "{SELECT_COLUMNS}{where_sql} ORDER BY created_at DESC, id LIMIT ? OFFSET ?"
        );
        let mut data_q = sqlx::query_as::<_, LeaveRow>(&data_sql);
        for arg in args {
            data_q = data_q.bind(arg);
        }
        let rows = data_q
            .bind(page.page_size)
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .context("fetch leave list")?;

        Ok(LeavePage {
            leaves: into_requests(rows)?,
            pagination: Pagination::new(page, total.max(0) as u64),
        })
    }

    async fn list_all(&self, filter: &LeaveFilter) -> anyhow::Result<Vec<LeaveRequest>> {
        let (where_sql, args) = where_clause(filter);
        let sql = format!("{SELECT_COLUMNS}{where_sql} ORDER BY created_at DESC, id");
        let mut q = sqlx::query_as::<_, LeaveRow>(&sql);
        for arg in args {
            q = q.bind(arg);
        }
        let rows = q.fetch_all(&self.pool).await.context("fetch leave calendar rows")?;
        into_requests(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn where_clause_binds_in_order() {
        let (sql, args) = where_clause(&LeaveFilter {
            employee_id: Some("E1".into()),
            status: Some(LeaveStatus::Open),
        });
        assert_eq!(sql, " WHERE 1=1 AND employee_id = ? AND status = ?");
        assert_eq!(args, ["E1", "OPEN"]);
    }

    #[test]
    fn row_with_unknown_status_is_rejected() {
        let now = Utc::now();
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let row = LeaveRow {
            id: "L1".into(),
            employee_id: "E1".into(),
            leave_type: "Sick".into(),
            from_date: day,
            to_date: day,
            is_half_day: false,
            reason: "flu".into(),
            status: "archived".into(),
            approver_id: None,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
            decided_at: None,
        };
        assert!(LeaveRequest::try_from(row).is_err());
    }
}
