use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::leave_request::LeaveApplication;

/// Application counts per status, from `GET /statistics`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Statistics {
    #[schema(example = 6)]
    pub total: u32,
    #[schema(example = 2)]
    pub pending: u32,
    #[schema(example = 3)]
    pub approved: u32,
    #[schema(example = 1)]
    pub rejected: u32,
}

/// Dashboard summary of the signed-in employee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DashboardData {
    pub statistics: Statistics,
    pub recent_applications: Vec<LeaveApplication>,
    pub upcoming_leave: Vec<LeaveApplication>,
}
