//! Access to the upstream HRM backend, which owns allocations, leave types,
//! holidays and leave applications.

pub mod error;
pub mod http;
pub mod normalize;

use async_trait::async_trait;

use crate::model::dashboard::DashboardData;
use crate::model::holiday::HolidayEntry;
use crate::model::leave_allocation::LeaveAllocation;
use crate::model::leave_request::{LeaveApplication, LeaveApplicationPayload, LeaveStatus};
use crate::model::leave_type::LeaveType;
use crate::model::user::UserProfile;

pub use error::ServiceError;
pub use http::HttpLeaveService;

#[async_trait(?Send)]
pub trait LeaveService: Send + Sync {
    async fn fetch_profile(&self, token: &str) -> Result<UserProfile, ServiceError>;

    async fn fetch_leave_types(&self) -> Result<Vec<LeaveType>, ServiceError>;

    async fn fetch_holidays(&self) -> Result<Vec<HolidayEntry>, ServiceError>;

    /// `NotFound` means the employee has no allocations at all.
    async fn fetch_allocations(&self, token: &str, employee_id: u64) -> Result<Vec<LeaveAllocation>, ServiceError>;

    async fn submit_leave_application(
        &self,
        token: &str,
        payload: &LeaveApplicationPayload,
        idempotency_key: &str,
    ) -> Result<LeaveApplication, ServiceError>;

    /// The caller's applications; `None` returns every status.
    async fn fetch_leave_applications(
        &self,
        token: &str,
        status: Option<LeaveStatus>,
    ) -> Result<Vec<LeaveApplication>, ServiceError>;

    async fn fetch_dashboard(&self, token: &str) -> Result<DashboardData, ServiceError>;
}
