use serde::Serialize;
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::model::leave_allocation::{AllocationSet, LeaveAllocation};

/// Presentation colour assigned to a leave type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PaletteColor {
    Orange,
    Red,
    Blue,
    Purple,
    Green,
    Yellow,
    Indigo,
    Pink,
}

pub const PALETTE: [PaletteColor; 8] = [
    PaletteColor::Orange,
    PaletteColor::Red,
    PaletteColor::Blue,
    PaletteColor::Purple,
    PaletteColor::Green,
    PaletteColor::Yellow,
    PaletteColor::Indigo,
    PaletteColor::Pink,
];

impl PaletteColor {
    /// Type ids are 1-based, so id 1 gets the first colour.
    pub fn for_leave_type(leave_type_id: u32) -> Self {
        let idx = (i64::from(leave_type_id) - 1).rem_euclid(PALETTE.len() as i64);
        PALETTE[idx as usize]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BalanceStatus {
    Available,
    Exhausted,
}

/// Balance of one leave type, derived from its allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct LeaveBalance {
    pub leave_type_id: u32,
    pub name: String,
    pub allocated: u32,
    pub used: u32,
    pub remaining: u32,
    pub color: PaletteColor,
    pub status: BalanceStatus,
}

impl From<&LeaveAllocation> for LeaveBalance {
    fn from(allocation: &LeaveAllocation) -> Self {
        let remaining = allocation.remaining_days;
        Self {
            leave_type_id: allocation.leave_type_id,
            name: allocation.leave_type_name.clone(),
            allocated: allocation.allocated_days,
            used: allocation.used_days(),
            remaining,
            color: PaletteColor::for_leave_type(allocation.leave_type_id),
            status: if remaining > 0 {
                BalanceStatus::Available
            } else {
                BalanceStatus::Exhausted
            },
        }
    }
}

/// Outcome of looking up a leave type's balance.
///
/// `NoAllocations` and a zero balance are different things: the first means
/// the employee has nothing allocated at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BalanceLookup {
    Found(LeaveBalance),
    Missing,
    NoAllocations,
}

impl BalanceLookup {
    pub fn balance(&self) -> Option<&LeaveBalance> {
        match self {
            BalanceLookup::Found(b) => Some(b),
            _ => None,
        }
    }
}

pub fn lookup_balance(leave_type_id: Option<u32>, allocations: &AllocationSet) -> BalanceLookup {
    if allocations.has_no_allocations() {
        return BalanceLookup::NoAllocations;
    }

    let Some(id) = leave_type_id else {
        return BalanceLookup::Missing;
    };

    allocations
        .allocations()
        .iter()
        .find(|a| a.leave_type_id == id)
        .map(|a| BalanceLookup::Found(a.into()))
        .unwrap_or(BalanceLookup::Missing)
}

/// Every allocation as a balance row, in upstream order.
pub fn all_balances(allocations: &AllocationSet) -> Vec<LeaveBalance> {
    allocations.allocations().iter().map(LeaveBalance::from).collect()
}
