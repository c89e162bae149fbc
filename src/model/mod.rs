pub mod dashboard;
pub mod holiday;
pub mod leave_allocation;
pub mod leave_request;
pub mod leave_type;
pub mod user;
