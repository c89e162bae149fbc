//! The employee's leave application history, filtered by status.
//!
//! Two upstream reads feed it: the filtered list and the dashboard summary.
//! When the filtered list is empty or unavailable, the dashboard's recent
//! applications are filtered locally instead.

use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use crate::client::ServiceError;
use crate::model::dashboard::{DashboardData, Statistics};
use crate::model::leave_request::{LeaveApplication, StatusFilter};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ApplicationHistory {
    #[schema(example = "pending")]
    pub filter: String,
    pub statistics: Statistics,
    pub applications: Vec<LeaveApplication>,
    pub upcoming_leave: Vec<LeaveApplication>,
    /// Set when the dashboard summary could not be loaded
    pub statistics_error: Option<String>,
    /// Set when the filtered list could not be loaded
    pub applications_error: Option<String>,
}

/// The list to show for `filter`: the upstream result, or the matching
/// recent applications when that result is empty.
pub fn select_applications(
    filter: StatusFilter,
    fetched: Vec<LeaveApplication>,
    recent: &[LeaveApplication],
) -> Vec<LeaveApplication> {
    if !fetched.is_empty() {
        return fetched;
    }
    recent
        .iter()
        .filter(|app| filter.matches(app.status))
        .cloned()
        .collect()
}

/// Combine both reads. An expired session fails the whole request, as does
/// losing both reads; losing one of them is reported in the result.
pub fn assemble(
    filter: StatusFilter,
    dashboard: Result<DashboardData, ServiceError>,
    fetched: Result<Vec<LeaveApplication>, ServiceError>,
) -> Result<ApplicationHistory, ServiceError> {
    if matches!(dashboard, Err(ServiceError::Unauthorized)) || matches!(fetched, Err(ServiceError::Unauthorized)) {
        return Err(ServiceError::Unauthorized);
    }

    let (dashboard, statistics_error) = match dashboard {
        Ok(data) => (data, None),
        Err(e) => {
            warn!(error = %e, "Dashboard summary unavailable");
            if let Err(fetch_err) = fetched {
                return Err(fetch_err);
            }
            (DashboardData::default(), Some(format!("Failed to load statistics: {e}")))
        }
    };

    let (fetched, applications_error) = match fetched {
        Ok(list) => (list, None),
        Err(e) => {
            warn!(error = %e, %filter, "Leave applications unavailable, using recent applications");
            (Vec::new(), Some(format!("Failed to load leave applications: {e}")))
        }
    };

    Ok(ApplicationHistory {
        filter: filter.to_string(),
        statistics: dashboard.statistics,
        applications: select_applications(filter, fetched, &dashboard.recent_applications),
        upcoming_leave: dashboard.upcoming_leave,
        statistics_error,
        applications_error,
    })
}
