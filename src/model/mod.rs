pub mod leave_interval;
pub mod leave_request;
pub mod pagination;
