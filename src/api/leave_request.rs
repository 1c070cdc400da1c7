use std::collections::BTreeMap;
use std::str::FromStr;

use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::calendar::{DayStatusMap, RenderPrecedence};
use crate::error::{InvalidRangeError, LeaveError, ValidationError};
use crate::model::leave_interval::IntervalStatus;
use crate::model::leave_request::{Decision, LeaveRequest, LeaveStatus};
use crate::model::pagination::{LeavePage, PageRequest};
use crate::repository::LeaveFilter;
use crate::workflow::{LeaveCommand, LeaveWorkflow, StatusUpdate, SubmitLeave, parse_day};

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveQuery {
    #[schema(example = "E1")]
    /// Filter by employee ID
    pub employee_id: Option<String>,
    #[schema(example = "OPEN")]
    /// Filter by leave status (OPEN, Approved, Rejected)
    pub status: Option<String>,
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u64>,
    #[schema(example = 10)]
    /// Items per page (max 100)
    pub page_size: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CalendarView {
    /// Every status with all of its days; a day may appear under several.
    #[default]
    Raw,
    /// One status per day, approved first, then pending, then rejected.
    Resolved,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct CalendarQuery {
    #[schema(example = "E1")]
    /// Only this employee's leaves
    pub employee_id: Option<String>,
    #[schema(example = "2024-03-01")]
    /// First day to show (inclusive)
    pub from: Option<String>,
    #[schema(example = "2024-03-31")]
    /// Last day to show (inclusive)
    pub to: Option<String>,
    /// raw (default) or resolved
    pub view: Option<CalendarView>,
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum CalendarResponse {
    Raw(DayStatusMap),
    Resolved(BTreeMap<NaiveDate, IntervalStatus>),
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApproveLeave {
    #[schema(example = "HR-7")]
    pub approver_id: String,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RejectLeave {
    #[schema(example = "HR-7")]
    pub approver_id: String,
    #[schema(example = "Team is at minimum staffing that week")]
    pub rejection_reason: Option<String>,
}

fn status_filter(status: Option<&str>) -> Result<Option<LeaveStatus>, ValidationError> {
    status
        .map(|s| LeaveStatus::from_str(s.trim()).map_err(|_| ValidationError::new(["status"])))
        .transpose()
}

fn query_day(value: Option<&str>, field: &str) -> Result<Option<NaiveDate>, ValidationError> {
    value
        .map(|v| parse_day(v).ok_or_else(|| ValidationError::new([field])))
        .transpose()
}

/* =========================
Submit leave request
========================= */
/// Submit a new leave request; it starts out OPEN.
#[utoipa::path(
    post,
    path = "/api/v1/leave",
    request_body(
        content = SubmitLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave request submitted", body = LeaveRequest),
        (status = 400, description = "Missing/invalid fields or end date before start date", body = Object, example = json!({
            "message": "missing or invalid fields: employeeId",
            "fields": ["employeeId"]
        }))
    ),
    tag = "Leave"
)]
pub async fn submit_leave(
    workflow: web::Data<LeaveWorkflow>,
    payload: web::Json<SubmitLeave>,
) -> Result<HttpResponse, LeaveError> {
    let leave = workflow.submit(&payload).await?;
    Ok(HttpResponse::Created().json(leave))
}

/* =========================
Update leave status
========================= */
/// Approve or reject an OPEN leave request.
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/status",
    params(
        ("leave_id" = String, Path, description = "ID of the leave request to decide")
    ),
    request_body = StatusUpdate,
    responses(
        (status = 200, description = "Leave request decided", body = LeaveRequest),
        (status = 400, description = "Missing approver or rejection reason"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Leave request already decided or being decided", body = Object, example = json!({
            "message": "leave request 7b0c6d4e-1f43-4a8e-9a55-3c1f1c2d9e10 is already Approved"
        }))
    ),
    tag = "Leave"
)]
pub async fn update_status(
    workflow: web::Data<LeaveWorkflow>,
    path: web::Path<String>,
    body: web::Json<StatusUpdate>,
) -> Result<HttpResponse, LeaveError> {
    let mut update = body.into_inner();
    update.leave_id = path.into_inner();

    let leave = workflow.update_status(&update).await?;
    Ok(HttpResponse::Ok().json(leave))
}

/* =========================
Approve leave
========================= */
/// Shorthand for a status update to Approved.
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/approve",
    params(
        ("leave_id" = String, Path, description = "ID of the leave request to approve")
    ),
    request_body = ApproveLeave,
    responses(
        (status = 200, description = "Leave approved", body = LeaveRequest),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Leave request already decided")
    ),
    tag = "Leave"
)]
pub async fn approve_leave(
    workflow: web::Data<LeaveWorkflow>,
    path: web::Path<String>,
    body: web::Json<ApproveLeave>,
) -> Result<HttpResponse, LeaveError> {
    let update = StatusUpdate {
        leave_id: path.into_inner(),
        status: Decision::Approved,
        rejection_reason: None,
        approver_id: body.into_inner().approver_id,
    };

    let leave = workflow.update_status(&update).await?;
    Ok(HttpResponse::Ok().json(leave))
}

/* =========================
Reject leave
========================= */
/// Shorthand for a status update to Rejected.
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/reject",
    params(
        ("leave_id" = String, Path, description = "ID of the leave request to reject")
    ),
    request_body = RejectLeave,
    responses(
        (status = 200, description = "Leave rejected", body = LeaveRequest),
        (status = 400, description = "Rejection reason missing"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Leave request already decided")
    ),
    tag = "Leave"
)]
pub async fn reject_leave(
    workflow: web::Data<LeaveWorkflow>,
    path: web::Path<String>,
    body: web::Json<RejectLeave>,
) -> Result<HttpResponse, LeaveError> {
    let body = body.into_inner();
    let update = StatusUpdate {
        leave_id: path.into_inner(),
        status: Decision::Rejected,
        rejection_reason: body.rejection_reason,
        approver_id: body.approver_id,
    };

    let leave = workflow.update_status(&update).await?;
    Ok(HttpResponse::Ok().json(leave))
}

/// Run a tagged leave command (`"action": "submit" | "update_status"`).
#[utoipa::path(
    post,
    path = "/api/v1/leave/commands",
    request_body(
        content = Object,
        description = "SubmitLeave or StatusUpdate fields plus an `action` tag",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Command applied", body = LeaveRequest),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Leave request already decided")
    ),
    tag = "Leave"
)]
pub async fn run_command(
    workflow: web::Data<LeaveWorkflow>,
    command: web::Json<LeaveCommand>,
) -> Result<HttpResponse, LeaveError> {
    let leave = workflow.execute(&command).await?;
    Ok(HttpResponse::Ok().json(leave))
}

/// for getting a leave application details endpoint
#[utoipa::path(
    get,
    path = "/api/v1/leave/{leave_id}",
    params(
        ("leave_id" = String, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequest),
        (status = 404, description = "Leave request not found", body = Object, example = json!({
            "message": "leave request 42 not found"
        }))
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    workflow: web::Data<LeaveWorkflow>,
    path: web::Path<String>,
) -> Result<HttpResponse, LeaveError> {
    let leave = workflow.get(&path).await?;
    Ok(HttpResponse::Ok().json(leave))
}

/// for getting leave applications endpoint
#[utoipa::path(
    get,
    path = "/api/v1/leave",
    params(LeaveQuery),
    responses(
        (status = 200, description = "Paginated leave list", body = LeavePage),
        (status = 400, description = "Unknown status filter")
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    workflow: web::Data<LeaveWorkflow>,
    query: web::Query<LeaveQuery>,
) -> Result<HttpResponse, LeaveError> {
    let filter = LeaveFilter {
        employee_id: query.employee_id.clone(),
        status: status_filter(query.status.as_deref())?,
    };
    let page = PageRequest::new(query.page, query.page_size);

    let leaves = workflow.list(&filter, page).await?;
    Ok(HttpResponse::Ok().json(leaves))
}

/// Calendar markings for the matching leave requests.
#[utoipa::path(
    get,
    path = "/api/v1/leave/calendar",
    params(CalendarQuery),
    responses(
        (status = 200, description = "Days per status (raw) or status per day (resolved)", body = DayStatusMap),
        (status = 400, description = "Bad date or window")
    ),
    tag = "Leave"
)]
pub async fn leave_calendar(
    workflow: web::Data<LeaveWorkflow>,
    query: web::Query<CalendarQuery>,
) -> Result<HttpResponse, LeaveError> {
    let from = query_day(query.from.as_deref(), "from")?;
    let to = query_day(query.to.as_deref(), "to")?;
    if let (Some(from), Some(to)) = (from, to) {
        if to < from {
            return Err(InvalidRangeError::new(from, to).into());
        }
    }

    let filter = LeaveFilter {
        employee_id: query.employee_id.clone(),
        status: None,
    };
    let map = workflow.calendar(&filter, from, to).await?;

    let body = match query.view.unwrap_or_default() {
        CalendarView::Raw => CalendarResponse::Raw(map),
        CalendarView::Resolved => CalendarResponse::Resolved(RenderPrecedence::default().resolve(&map)),
    };
    Ok(HttpResponse::Ok().json(body))
}

/// Leave types accepted on submission.
#[utoipa::path(
    get,
    path = "/api/v1/leave/types",
    responses(
        (status = 200, description = "Configured leave types", body = Vec<String>, example = json!(["Vacation", "Sick"]))
    ),
    tag = "Leave"
)]
pub async fn leave_types(workflow: web::Data<LeaveWorkflow>) -> HttpResponse {
    HttpResponse::Ok().json(workflow.leave_types())
}

/// Registers the `/leave` scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/leave")
            // /leave
            .service(
                web::resource("")
                    .route(web::get().to(leave_list))
                    .route(web::post().to(submit_leave)),
            )
            // fixed paths before /leave/{id}
            .service(web::resource("/calendar").route(web::get().to(leave_calendar)))
            .service(web::resource("/types").route(web::get().to(leave_types)))
            .service(web::resource("/commands").route(web::post().to(run_command)))
            // /leave/{id}
            .service(web::resource("/{id}").route(web::get().to(get_leave)))
            // /leave/{id}/status
            .service(web::resource("/{id}/status").route(web::put().to(update_status)))
            // /leave/{id}/approve
            .service(web::resource("/{id}/approve").route(web::put().to(approve_leave)))
            // /leave/{id}/reject
            .service(web::resource("/{id}/reject").route(web::put().to(reject_leave))),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use serde_json::{Value, json};

    use crate::repository::MemoryLeaveRepository;

    fn workflow() -> web::Data<LeaveWorkflow> {
        web::Data::new(LeaveWorkflow::new(
            Arc::new(MemoryLeaveRepository::new()),
            vec!["Vacation".into(), "Sick".into()],
        ))
    }

    macro_rules! app {
        ($workflow:expr) => {
            test::init_service(
                App::new()
                    .app_data($workflow.clone())
                    .service(web::scope("/api/v1").configure(configure)),
            )
            .await
        };
    }

    fn submission(from: &str, to: &str) -> Value {
        json!({
            "employeeId": "E1",
            "type": "Vacation",
            "startDate": from,
            "endDate": to,
            "reason": "family"
        })
    }

    #[actix_web::test]
    async fn submit_approve_and_read_calendar() {
        let wf = workflow();
        let app = app!(wf);

        let req = test::TestRequest::post()
            .uri("/api/v1/leave")
            .set_json(submission("2024-03-01", "2024-03-03"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let leave: Value = test::read_body_json(resp).await;
        assert_eq!(leave["status"], "OPEN");
        let id = leave["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::get()
            .uri("/api/v1/leave/calendar?employee_id=E1")
            .to_request();
        let calendar: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(calendar["pending"], json!(["2024-03-01", "2024-03-02", "2024-03-03"]));
        assert_eq!(calendar["approved"], json!([]));

        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/leave/{id}/approve"))
            .set_json(json!({ "approverId": "HR-1" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri("/api/v1/leave/calendar?employee_id=E1&from=2024-03-02")
            .to_request();
        let calendar: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(calendar["approved"], json!(["2024-03-02", "2024-03-03"]));
        assert_eq!(calendar["pending"], json!([]));

        // already decided
        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/leave/{id}/reject"))
            .set_json(json!({ "approverId": "HR-1", "rejectionReason": "late" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn validation_errors_list_fields() {
        let wf = workflow();
        let app = app!(wf);

        let mut body = submission("2024-03-01", "2024-03-03");
        body["employeeId"] = json!("");
        let req = test::TestRequest::post().uri("/api/v1/leave").set_json(body).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let err: Value = test::read_body_json(resp).await;
        assert_eq!(err["fields"], json!(["employeeId"]));

        let req = test::TestRequest::post()
            .uri("/api/v1/leave")
            .set_json(submission("2024-01-10", "2024-01-05"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn reject_requires_reason_over_status_route() {
        let wf = workflow();
        let app = app!(wf);

        let req = test::TestRequest::post()
            .uri("/api/v1/leave")
            .set_json(submission("2024-03-01", "2024-03-01"))
            .to_request();
        let leave: Value = test::call_and_read_body_json(&app, req).await;
        let id = leave["id"].as_str().unwrap();

        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/leave/{id}/status"))
            .set_json(json!({ "status": "Rejected", "approverId": "HR-1" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let err: Value = test::read_body_json(resp).await;
        assert_eq!(err["fields"], json!(["rejectionReason"]));

        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/leave/{id}/status"))
            .set_json(json!({
                "status": "Rejected",
                "approverId": "HR-1",
                "rejectionReason": "short staffed"
            }))
            .to_request();
        let decided: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(decided["status"], "Rejected");
        assert_eq!(decided["rejectionReason"], "short staffed");
    }

    #[actix_web::test]
    async fn list_pages_and_filters() {
        let wf = workflow();
        let app = app!(wf);

        for day in ["2024-04-01", "2024-04-08", "2024-04-15"] {
            let req = test::TestRequest::post()
                .uri("/api/v1/leave")
                .set_json(submission(day, day))
                .to_request();
            test::call_service(&app, req).await;
        }

        let req = test::TestRequest::get()
            .uri("/api/v1/leave?employee_id=E1&status=open&page=1&page_size=2")
            .to_request();
        let page: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(page["leaves"].as_array().unwrap().len(), 2);
        assert_eq!(page["pagination"]["total"], 3);
        assert_eq!(page["pagination"]["total_pages"], 2);
        assert_eq!(page["pagination"]["has_next"], true);
        assert_eq!(page["pagination"]["has_prev"], false);

        let req = test::TestRequest::get().uri("/api/v1/leave?status=archived").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn far_page_is_empty_not_an_error() {
        let wf = workflow();
        let app = app!(wf);

        let req = test::TestRequest::post()
            .uri("/api/v1/leave")
            .set_json(submission("2024-04-01", "2024-04-01"))
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/leave?page={}&page_size=100", u64::MAX))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let page: Value = test::read_body_json(resp).await;
        assert_eq!(page["leaves"], json!([]));
        assert_eq!(page["pagination"]["total"], 1);
        assert_eq!(page["pagination"]["has_next"], false);
    }

    #[actix_web::test]
    async fn resolved_calendar_and_commands() {
        let wf = workflow();
        let app = app!(wf);

        let mut command = submission("2024-06-03", "2024-06-04");
        command["action"] = json!("submit");
        let req = test::TestRequest::post()
            .uri("/api/v1/leave/commands")
            .set_json(command)
            .to_request();
        let first: Value = test::call_and_read_body_json(&app, req).await;

        let req = test::TestRequest::post()
            .uri("/api/v1/leave")
            .set_json(submission("2024-06-04", "2024-06-05"))
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::post()
            .uri("/api/v1/leave/commands")
            .set_json(json!({
                "action": "update_status",
                "leaveId": first["id"],
                "status": "Approved",
                "approverId": "HR-2"
            }))
            .to_request();
        let approved: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(approved["approverId"], "HR-2");

        let req = test::TestRequest::get()
            .uri("/api/v1/leave/calendar?view=resolved")
            .to_request();
        let resolved: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(
            resolved,
            json!({
                "2024-06-03": "approved",
                "2024-06-04": "approved",
                "2024-06-05": "pending"
            })
        );

        let req = test::TestRequest::get()
            .uri("/api/v1/leave/calendar?from=2024-06-05&to=2024-06-01")
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn missing_leave_and_types() {
        let wf = workflow();
        let app = app!(wf);

        let req = test::TestRequest::get().uri("/api/v1/leave/unknown").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get().uri("/api/v1/leave/types").to_request();
        let types: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(types, json!(["Vacation", "Sick"]));
    }
}
