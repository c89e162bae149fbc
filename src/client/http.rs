use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, warn};

use super::error::ServiceError;
use super::normalize::decode;
use super::LeaveService;
use crate::config::Config;
use crate::model::dashboard::DashboardData;
use crate::model::holiday::HolidayEntry;
use crate::model::leave_allocation::LeaveAllocation;
use crate::model::leave_request::{LeaveApplication, LeaveApplicationPayload, LeaveStatus};
use crate::model::leave_type::LeaveType;
use crate::model::user::UserProfile;

/// Error body shape used by the upstream backend.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
    errors: Option<BTreeMap<String, Vec<String>>>,
}

/// Map a non-success response onto [`ServiceError`].
pub(crate) fn error_from_response(status: StatusCode, body: &str) -> ServiceError {
    if status == StatusCode::UNAUTHORIZED {
        return ServiceError::Unauthorized;
    }

    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .message
        .or(parsed.error)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

    if status == StatusCode::NOT_FOUND {
        return ServiceError::NotFound(message);
    }

    match parsed.errors {
        Some(errors) if !errors.is_empty() => ServiceError::Validation { message, errors },
        _ => ServiceError::Rejected {
            status: status.as_u16(),
            message,
        },
    }
}

/// [`LeaveService`] over the upstream REST API.
#[derive(Clone)]
pub struct HttpLeaveService {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpLeaveService {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ServiceError> {
        Self::new(
            &config.upstream_base_url,
            config.upstream_api_key.clone(),
            Duration::from_secs(config.upstream_timeout_secs),
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Leave types and holidays are public reference data keyed by API key.
    fn with_api_key(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => req.header("X-API-KEY", key),
            None => req,
        }
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ServiceError> {
        let response = req
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Upstream request failed");
                ServiceError::Transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "Upstream returned an error");
            return Err(error_from_response(status, &body));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ServiceError::InvalidResponse(e.to_string()))?;
        decode(body)
    }
}

#[async_trait(?Send)]
impl LeaveService for HttpLeaveService {
    async fn fetch_profile(&self, token: &str) -> Result<UserProfile, ServiceError> {
        debug!("Fetching user profile");
        self.send(self.client.get(self.url("/user")).bearer_auth(token)).await
    }

    async fn fetch_leave_types(&self) -> Result<Vec<LeaveType>, ServiceError> {
        debug!("Fetching leave types");
        self.send(self.with_api_key(self.client.get(self.url("/leavetypes"))))
            .await
    }

    async fn fetch_holidays(&self) -> Result<Vec<HolidayEntry>, ServiceError> {
        debug!("Fetching holiday list");
        self.send(self.with_api_key(self.client.get(self.url("/holidaylist"))))
            .await
    }

    async fn fetch_allocations(&self, token: &str, employee_id: u64) -> Result<Vec<LeaveAllocation>, ServiceError> {
        debug!(employee_id, "Fetching leave allocations");
        let req = self
            .client
            .get(self.url("/leave-allocations"))
            .query(&[("employee_id", employee_id)])
            .bearer_auth(token);
        self.send(req).await
    }

    async fn submit_leave_application(
        &self,
        token: &str,
        payload: &LeaveApplicationPayload,
        idempotency_key: &str,
    ) -> Result<LeaveApplication, ServiceError> {
        debug!(employee_id = payload.employee_id, "Submitting leave application");
        let req = self
            .client
            .post(self.url("/leave-applications"))
            .bearer_auth(token)
            .header("Idempotency-Key", idempotency_key)
            .json(payload);
        self.send(req).await
    }

    async fn fetch_leave_applications(
        &self,
        token: &str,
        status: Option<LeaveStatus>,
    ) -> Result<Vec<LeaveApplication>, ServiceError> {
        debug!(?status, "Fetching leave applications");
        let mut req = self
            .client
            .get(self.url("/leave-applications/status"))
            .bearer_auth(token);
        if let Some(status) = status {
            req = req.query(&[("status", status.to_string())]);
        }
        self.send(req).await
    }

    async fn fetch_dashboard(&self, token: &str) -> Result<DashboardData, ServiceError> {
        debug!("Fetching dashboard statistics");
        self.send(self.client.get(self.url("/statistics")).bearer_auth(token))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_ignores_body() {
        let err = error_from_response(StatusCode::UNAUTHORIZED, r#"{"message":"Unauthenticated."}"#);
        assert!(matches!(err, ServiceError::Unauthorized));
    }

    #[test]
    fn not_found_is_distinct() {
        let err = error_from_response(StatusCode::NOT_FOUND, "");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Not found: HTTP 404");
    }

    #[test]
    fn field_errors_are_kept() {
        let body = r#"{
            "message": "The given data was invalid.",
            "errors": { "start_date": ["The start date must be a date after today."] }
        }"#;
        let ServiceError::Validation { message, errors } = error_from_response(StatusCode::UNPROCESSABLE_ENTITY, body)
        else {
            panic!("expected validation error");
        };
        assert_eq!(message, "The given data was invalid.");
        assert_eq!(errors["start_date"], vec!["The start date must be a date after today."]);
    }

    #[test]
    fn falls_back_to_error_key_then_status() {
        let err = error_from_response(StatusCode::INTERNAL_SERVER_ERROR, r#"{"error":"Server exploded"}"#);
        assert_eq!(err.to_string(), "Server exploded");

        let err = error_from_response(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert!(matches!(err, ServiceError::Rejected { status: 502, .. }));
        assert_eq!(err.to_string(), "HTTP 502");
    }

    #[test]
    fn trims_trailing_slash_from_base_url() {
        let service = HttpLeaveService::new("http://localhost:8000/api/", None, Duration::from_secs(5)).unwrap();
        assert_eq!(service.url("/user"), "http://localhost:8000/api/user");
    }
}
