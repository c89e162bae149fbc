use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

const NOT_ASSIGNED: &str = "Not assigned";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NamedRef {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EmployeeProfile {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub division: Option<NamedRef>,
    #[serde(default, rename = "leaveApprover", alias = "leave_approver")]
    pub leave_approver: Option<NamedRef>,
}

/// Signed-in user as returned by the upstream `/user` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub employee: Option<EmployeeProfile>,
}

impl UserProfile {
    /// Employee record id, falling back to the user id for accounts
    /// without a linked employee.
    pub fn employee_id(&self) -> u64 {
        self.employee.as_ref().map(|e| e.id).unwrap_or(self.id)
    }

    pub fn division_id(&self) -> Option<u64> {
        self.employee.as_ref()?.division.as_ref().map(|d| d.id)
    }

    pub fn leave_approver_id(&self) -> Option<u64> {
        self.employee.as_ref()?.leave_approver.as_ref().map(|a| a.id)
    }

    pub fn display(&self) -> DisplayNames {
        let employee = self.employee.as_ref();
        DisplayNames {
            employee_name: employee
                .and_then(|e| e.name.clone())
                .unwrap_or_else(|| self.name.clone()),
            division_name: employee
                .and_then(|e| e.division.as_ref())
                .map(|d| d.name.clone())
                .unwrap_or_else(|| NOT_ASSIGNED.to_string()),
            leave_approver_name: employee
                .and_then(|e| e.leave_approver.as_ref())
                .map(|a| a.name.clone())
                .unwrap_or_else(|| NOT_ASSIGNED.to_string()),
        }
    }
}

/// Read-only names shown next to the session-derived identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DisplayNames {
    pub employee_name: String,
    pub division_name: String,
    pub leave_approver_name: String,
}

impl Default for DisplayNames {
    fn default() -> Self {
        Self {
            employee_name: NOT_ASSIGNED.to_string(),
            division_name: NOT_ASSIGNED.to_string(),
            leave_approver_name: NOT_ASSIGNED.to_string(),
        }
    }
}
