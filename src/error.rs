use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use chrono::NaiveDate;
use serde_json::json;
use thiserror::Error;

use crate::model::leave_request::LeaveStatus;

/// One or more required fields were missing or malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing or invalid fields: {}", .fields.join(", "))]
pub struct ValidationError {
    pub fields: Vec<String>,
}

impl ValidationError {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }
}

/// A date range whose end falls before its start.
///
/// `index` is filled in when the range came from a batch (see
/// [`crate::calendar::aggregate`]) so callers can point at the bad entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("end date {end} is before start date {start}{}", index_suffix(.index))]
pub struct InvalidRangeError {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub index: Option<usize>,
}

impl InvalidRangeError {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            index: None,
        }
    }

    pub fn at(self, index: usize) -> Self {
        Self {
            index: Some(index),
            ..self
        }
    }
}

fn index_suffix(index: &Option<usize>) -> String {
    index.map(|i| format!(" (interval #{i})")).unwrap_or_default()
}

#[derive(Debug, Error)]
pub enum LeaveError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    InvalidRange(#[from] InvalidRangeError),

    #[error("leave request {leave_id} is already {status}")]
    InvalidTransition { leave_id: String, status: LeaveStatus },

    #[error("leave request {leave_id} not found")]
    NotFound { leave_id: String },

    #[error("a status update for leave request {leave_id} is already in progress")]
    InFlight { leave_id: String },

    #[error("leave service unavailable: {0}")]
    Collaborator(String),
}

impl From<anyhow::Error> for LeaveError {
    fn from(e: anyhow::Error) -> Self {
        LeaveError::Collaborator(format!("{e:#}"))
    }
}

impl ResponseError for LeaveError {
    fn status_code(&self) -> StatusCode {
        match self {
            LeaveError::Validation(_) | LeaveError::InvalidRange(_) => StatusCode::BAD_REQUEST,
            LeaveError::InvalidTransition { .. } | LeaveError::InFlight { .. } => {
                StatusCode::CONFLICT
            }
            LeaveError::NotFound { .. } => StatusCode::NOT_FOUND,
            LeaveError::Collaborator(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            LeaveError::Validation(e) => json!({
                "message": self.to_string(),
                "fields": e.fields,
            }),
            // internals stay in the log
            LeaveError::Collaborator(_) => json!({
                "message": "Internal Server Error"
            }),
            _ => json!({
                "message": self.to_string()
            }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}
