use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, de};
use strum_macros::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};

use crate::model::leave_type::LeaveType;
use crate::utils::date::format_date;

const STATUS_NAMES: &[&str] = &["pending", "approved", "rejected"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LeaveStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

// Upstream casing varies ("Pending", "pending"), so parse loosely.
impl<'de> Deserialize<'de> for LeaveStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.trim()
            .parse()
            .map_err(|_| de::Error::unknown_variant(&raw, STATUS_NAMES))
    }
}

/// Status filter of the application history; `all` sends no filter upstream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Approved,
    Rejected,
}

impl StatusFilter {
    pub fn status(self) -> Option<LeaveStatus> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Pending => Some(LeaveStatus::Pending),
            StatusFilter::Approved => Some(LeaveStatus::Approved),
            StatusFilter::Rejected => Some(LeaveStatus::Rejected),
        }
    }

    pub fn matches(self, status: LeaveStatus) -> bool {
        self.status().is_none_or(|s| s == status)
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ApplicationQuery {
    /// One of `all`, `pending`, `approved`, `rejected` (default `all`)
    #[param(example = "pending")]
    pub status: Option<String>,
}

/// The in-progress leave request being edited.
///
/// `employee_id`, `division_id` and `leave_approver_id` come from the
/// signed-in user's profile and are not editable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct LeaveRequestDraft {
    #[schema(example = 1)]
    pub leave_type_id: Option<u32>,
    #[schema(example = "2026-01-05", format = "date", value_type = Option<String>)]
    pub start_date: Option<NaiveDate>,
    #[schema(example = "2026-01-06", format = "date", value_type = Option<String>)]
    pub end_date: Option<NaiveDate>,
    #[schema(example = "Family event out of town")]
    pub reason: String,
    pub employee_id: Option<u64>,
    pub division_id: Option<u64>,
    pub leave_approver_id: Option<u64>,
}

impl LeaveRequestDraft {
    /// Clear the editable fields, keeping the profile-derived identifiers.
    pub fn reset_editable(&mut self) {
        self.leave_type_id = None;
        self.start_date = None;
        self.end_date = None;
        self.reason.clear();
    }

    /// Build the upstream payload. Returns `None` while a required value is
    /// missing; callers gate on validation first.
    pub fn to_payload(&self) -> Option<LeaveApplicationPayload> {
        Some(LeaveApplicationPayload {
            employee_id: self.employee_id?,
            leave_type_id: self.leave_type_id?,
            start_date: format_date(self.start_date?),
            end_date: format_date(self.end_date?),
            reason: self.reason.trim().to_string(),
            division_id: self.division_id?,
            leave_approver_id: self.leave_approver_id?,
            status: LeaveStatus::Pending,
        })
    }
}

/// Body of `POST /leave-applications` on the upstream backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveApplicationPayload {
    pub employee_id: u64,
    pub leave_type_id: u32,
    pub start_date: String,
    pub end_date: String,
    pub reason: String,
    pub division_id: u64,
    pub leave_approver_id: u64,
    pub status: LeaveStatus,
}

/// Record returned by the upstream backend after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LeaveApplication {
    pub id: u64,
    #[schema(example = "2026-01-05")]
    pub start_date: String,
    #[schema(example = "2026-01-06")]
    pub end_date: String,
    #[serde(default)]
    pub total_leave_days: Option<u32>,
    #[serde(default)]
    pub status: LeaveStatus,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub leave_type: Option<LeaveType>,
}
