use crate::api::leave_request::{
    ApproveLeave, CalendarQuery, CalendarView, LeaveQuery, RejectLeave,
};
use crate::calendar::DayStatusMap;
use crate::model::leave_interval::{IntervalStatus, LeaveInterval};
use crate::model::leave_request::{Decision, LeaveRequest, LeaveStatus};
use crate::model::pagination::{LeavePage, Pagination};
use crate::workflow::{StatusUpdate, SubmitLeave};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leave Desk API",
        version = "1.0.0",
        description = r#"
## Leave Desk

Leave requests and the leave calendar for an HR back office.

### 🔹 Key Features
- **Leave Workflow**
  - Submit a leave request (starts out `OPEN`)
  - Approve or reject it; decided requests cannot change again
- **Leave Calendar**
  - Days covered by each status (`approved`, `pending`, `rejected`, `cancelled`)
  - Optional resolved view with one status per day

### 📦 Response Format
- JSON-based RESTful responses
- Errors carry a `message`; validation errors also list the offending `fields`
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::leave_request::leave_list,
        crate::api::leave_request::leave_calendar,
        crate::api::leave_request::leave_types,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::submit_leave,
        crate::api::leave_request::update_status,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,
        crate::api::leave_request::run_command,
    ),
    components(
        schemas(
            LeaveRequest,
            LeaveStatus,
            Decision,
            LeaveInterval,
            IntervalStatus,
            DayStatusMap,
            LeavePage,
            Pagination,
            SubmitLeave,
            StatusUpdate,
            ApproveLeave,
            RejectLeave,
            LeaveQuery,
            CalendarQuery,
            CalendarView
        )
    ),
    tags(
        (name = "Leave", description = "Leave workflow and calendar APIs"),
    )
)]
pub struct ApiDoc;
