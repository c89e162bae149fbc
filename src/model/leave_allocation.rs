use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Availability flag reported by the allocation source alongside the numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AllocationStatus {
    Available,
    Limited,
    Exhausted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AllocationPeriod {
    #[schema(example = "2025-01-01")]
    pub start_date: String,
    #[schema(example = "2025-12-31")]
    pub end_date: String,
}

/// Days granted to one employee for one leave type in the current period.
///
/// Read-only here: the allocation source guarantees
/// `remaining_days <= allocated_days`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "leave_type_id": 1,
    "leave_type_name": "Annual Leave",
    "allocated_days": 12,
    "remaining_days": 11,
    "status": "available",
    "allocation_period": { "start_date": "2025-01-01", "end_date": "2025-12-31" }
}))]
pub struct LeaveAllocation {
    pub leave_type_id: u32,
    pub leave_type_name: String,
    pub allocated_days: u32,
    pub remaining_days: u32,
    #[serde(default)]
    pub status: Option<AllocationStatus>,
    #[serde(default)]
    pub allocation_period: Option<AllocationPeriod>,
}

impl LeaveAllocation {
    pub fn used_days(&self) -> u32 {
        self.allocated_days.saturating_sub(self.remaining_days)
    }
}

/// What is known about the employee's allocations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AllocationSet {
    /// Not fetched yet.
    #[default]
    Unknown,
    Known(Vec<LeaveAllocation>),
    /// The source answered "none exist" (empty list or not-found).
    Empty,
    /// Transient failure; the message is shown with a retry affordance.
    Failed(String),
}

impl AllocationSet {
    pub fn from_list(allocations: Vec<LeaveAllocation>) -> Self {
        if allocations.is_empty() {
            AllocationSet::Empty
        } else {
            AllocationSet::Known(allocations)
        }
    }

    pub fn allocations(&self) -> &[LeaveAllocation] {
        match self {
            AllocationSet::Known(list) => list,
            _ => &[],
        }
    }

    pub fn has_no_allocations(&self) -> bool {
        matches!(self, AllocationSet::Empty)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            AllocationSet::Failed(msg) => Some(msg),
            _ => None,
        }
    }
}
