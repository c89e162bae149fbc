use crate::{
    api::{leave_applications, leave_form},
    auth::middleware::auth_middleware,
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

// Helper to build per-scope limiter
fn build_limiter(requests_per_min: u32) -> Option<Governor<PeerIpKeyExtractor, NoOpMiddleware>> {
    let per_ms = if requests_per_min == 0 {
        1
    } else {
        60_000 / requests_per_min as u64
    };
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms.max(1))
        .burst_size(requests_per_min.max(1))
        .key_extractor(PeerIpKeyExtractor)
        .finish()?;
    Some(Governor::new(&cfg))
}

/// Leave form routes, without rate limiting.
pub fn leave_form_scope() -> actix_web::Scope {
    web::scope("/leave-form")
        // /leave-form
        .service(
            web::resource("")
                .route(web::post().to(leave_form::open_form))
                .route(web::get().to(leave_form::get_form))
                .route(web::delete().to(leave_form::close_form)),
        )
        // /leave-form/draft
        .service(web::resource("/draft").route(web::patch().to(leave_form::edit_draft)))
        // /leave-form/allocations/refresh
        .service(
            web::resource("/allocations/refresh")
                .route(web::post().to(leave_form::refresh_allocations)),
        )
        // /leave-form/balances
        .service(web::resource("/balances").route(web::get().to(leave_form::list_balances)))
        // /leave-form/submit
        .service(web::resource("/submit").route(web::post().to(leave_form::submit)))
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    let protected_limiter = build_limiter(config.rate_protected_per_min);

    // Protected routes
    let scope = web::scope(&config.api_prefix)
        .wrap(from_fn(auth_middleware)) // authentication
        .service(leave_form_scope())
        // /leave-applications?status=
        .service(
            web::resource("/leave-applications").route(web::get().to(leave_applications::list_applications)),
        );

    match protected_limiter {
        Some(limiter) => cfg.service(scope.wrap(limiter)), // rate limiting
        None => {
            tracing::warn!("Rate limiter config rejected, serving without rate limiting");
            cfg.service(scope)
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::test_tokens;
    use crate::client::{LeaveService, ServiceError};
    use crate::form::FormRegistry;
    use crate::leave::BalancePolicy;
    use crate::model::dashboard::{DashboardData, Statistics};
    use crate::model::holiday::HolidayEntry;
    use crate::model::leave_allocation::LeaveAllocation;
    use crate::model::leave_request::{LeaveApplication, LeaveApplicationPayload, LeaveStatus};
    use crate::model::leave_type::LeaveType;
    use crate::model::user::UserProfile;
    use crate::models::TokenType;
    use actix_web::{App, http::StatusCode, test, web::Data};
    use async_trait::async_trait;
    use chrono::{Datelike, Duration};
    use serde_json::{Value, json};
    use std::sync::Arc;

    const SECRET: &str = "test-secret";

    struct StaticService;

    #[async_trait(?Send)]
    impl LeaveService for StaticService {
        async fn fetch_profile(&self, _token: &str) -> Result<UserProfile, ServiceError> {
            Ok(serde_json::from_value(json!({
                "id": 3,
                "name": "jdoe",
                "employee": {
                    "id": 7,
                    "name": "John Doe",
                    "division": { "id": 2, "name": "Finance" },
                    "leaveApprover": { "id": 9, "name": "Jane Roe" }
                }
            }))
            .unwrap())
        }

        async fn fetch_leave_types(&self) -> Result<Vec<LeaveType>, ServiceError> {
            Ok(vec![LeaveType {
                id: 1,
                name: "Annual Leave".into(),
            }])
        }

        async fn fetch_holidays(&self) -> Result<Vec<HolidayEntry>, ServiceError> {
            Ok(vec![])
        }

        async fn fetch_allocations(&self, _token: &str, _employee_id: u64) -> Result<Vec<LeaveAllocation>, ServiceError> {
            Ok(vec![LeaveAllocation {
                leave_type_id: 1,
                leave_type_name: "Annual Leave".into(),
                allocated_days: 12,
                remaining_days: 11,
                status: None,
                allocation_period: None,
            }])
        }

        async fn submit_leave_application(
            &self,
            _token: &str,
            payload: &LeaveApplicationPayload,
            _idempotency_key: &str,
        ) -> Result<LeaveApplication, ServiceError> {
            Ok(LeaveApplication {
                id: 100,
                start_date: payload.start_date.clone(),
                end_date: payload.end_date.clone(),
                total_leave_days: Some(1),
                status: LeaveStatus::Pending,
                reason: Some(payload.reason.clone()),
                leave_type: None,
            })
        }

        async fn fetch_leave_applications(
            &self,
            _token: &str,
            status: Option<LeaveStatus>,
        ) -> Result<Vec<LeaveApplication>, ServiceError> {
            // upstream only knows approved ones; others fall back to the dashboard
            Ok(match status {
                None | Some(LeaveStatus::Approved) => vec![record(12, LeaveStatus::Approved)],
                Some(_) => vec![],
            })
        }

        async fn fetch_dashboard(&self, _token: &str) -> Result<DashboardData, ServiceError> {
            Ok(DashboardData {
                statistics: Statistics {
                    total: 2,
                    pending: 1,
                    approved: 1,
                    rejected: 0,
                },
                recent_applications: vec![record(11, LeaveStatus::Pending), record(12, LeaveStatus::Approved)],
                upcoming_leave: vec![],
            })
        }
    }

    fn record(id: u64, status: LeaveStatus) -> LeaveApplication {
        LeaveApplication {
            id,
            start_date: "2025-07-21".into(),
            end_date: "2025-07-21".into(),
            total_leave_days: Some(1),
            status,
            reason: None,
            leave_type: None,
        }
    }

    fn test_config() -> Config {
        Config {
            jwt_secret: SECRET.into(),
            server_addr: "127.0.0.1:0".into(),
            api_prefix: "/api".into(),
            rate_protected_per_min: 1000,
            upstream_base_url: "http://upstream.invalid/api".into(),
            upstream_api_key: None,
            upstream_timeout_secs: 5,
            balance_policy: BalancePolicy::Block,
            form_idle_ttl_secs: 60,
            max_open_forms: 100,
        }
    }

    fn bearer(token_type: TokenType) -> (&'static str, String) {
        let token = test_tokens::issue(3, Some(7), token_type, SECRET);
        ("Authorization", format!("Bearer {token}"))
    }

    fn request(method: actix_web::http::Method, path: &str) -> test::TestRequest {
        test::TestRequest::default()
            .method(method)
            .uri(path)
            .peer_addr("127.0.0.1:40000".parse().unwrap())
    }

    macro_rules! app {
        () => {{
            let config = test_config();
            let service: Arc<dyn LeaveService> = Arc::new(StaticService);
            let registry = FormRegistry::new(
                Arc::clone(&service),
                BalancePolicy::Block,
                std::time::Duration::from_secs(60),
                100,
            );
            let route_config = config.clone();
            test::init_service(
                App::new()
                    .app_data(Data::new(registry))
                    .app_data(Data::new(config))
                    .app_data(Data::from(service))
                    .configure(move |cfg| configure(cfg, route_config.clone())),
            )
            .await
        }};
    }

    #[actix_web::test]
    async fn rejects_missing_and_refresh_tokens() {
        let app = app!();

        let resp = test::call_service(&app, request(actix_web::http::Method::GET, "/api/leave-form").to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = test::call_service(
            &app,
            request(actix_web::http::Method::GET, "/api/leave-form")
                .insert_header(bearer(TokenType::Refresh))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn full_form_lifecycle() {
        use actix_web::http::Method;
        let app = app!();
        let auth = bearer(TokenType::Access);

        let resp = test::call_service(
            &app,
            request(Method::GET, "/api/leave-form").insert_header(auth.clone()).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = test::call_service(
            &app,
            request(Method::POST, "/api/leave-form").insert_header(auth.clone()).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        // let the mount fetches finish
        let mut view = Value::Null;
        for _ in 0..50 {
            actix_web::rt::task::yield_now().await;
            view = test::call_and_read_body_json(
                &app,
                request(Method::GET, "/api/leave-form").insert_header(auth.clone()).to_request(),
            )
            .await;
            if view["loading_leave_types"] == false && view["balances"].as_array().is_some_and(|b| !b.is_empty()) {
                break;
            }
        }
        assert_eq!(view["draft"]["employee_id"], 7);
        assert_eq!(view["balances"][0]["color"], "orange");

        let today = chrono::Local::now().date_naive();
        let monday = today + Duration::days(i64::from(7 - today.weekday().num_days_from_monday()));
        let monday = monday.format("%Y-%m-%d").to_string();

        let resp = test::call_service(
            &app,
            request(Method::PATCH, "/api/leave-form/draft")
                .insert_header(auth.clone())
                .set_json(json!({ "start_date": "not-a-date" }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let view: Value = test::call_and_read_body_json(
            &app,
            request(Method::PATCH, "/api/leave-form/draft")
                .insert_header(auth.clone())
                .set_json(json!({
                    "leave_type_id": "1",
                    "start_date": monday,
                    "end_date": monday,
                    "reason": "Family event today"
                }))
                .to_request(),
        )
        .await;
        assert_eq!(view["validation"]["errors"], json!([]));
        assert_eq!(view["can_submit"], true);

        let resp = test::call_service(
            &app,
            request(Method::POST, "/api/leave-form/submit").insert_header(auth.clone()).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["application"]["id"], 100);
        assert_eq!(body["form"]["draft"]["leave_type_id"], Value::Null);
        assert_eq!(body["form"]["draft"]["employee_id"], 7);

        let resp = test::call_service(
            &app,
            request(Method::POST, "/api/leave-form/submit").insert_header(auth.clone()).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let resp = test::call_service(
            &app,
            request(Method::DELETE, "/api/leave-form").insert_header(auth.clone()).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let resp = test::call_service(
            &app,
            request(Method::GET, "/api/leave-form").insert_header(auth).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn application_history_filters_and_falls_back() {
        use actix_web::http::Method;
        let app = app!();
        let auth = bearer(TokenType::Access);

        let body: Value = test::call_and_read_body_json(
            &app,
            request(Method::GET, "/api/leave-applications?status=Approved")
                .insert_header(auth.clone())
                .to_request(),
        )
        .await;
        assert_eq!(body["filter"], "approved");
        assert_eq!(body["applications"][0]["id"], 12);
        assert_eq!(body["statistics"]["total"], 2);

        // nothing upstream for pending, so the recent list is filtered instead
        let body: Value = test::call_and_read_body_json(
            &app,
            request(Method::GET, "/api/leave-applications?status=pending")
                .insert_header(auth.clone())
                .to_request(),
        )
        .await;
        assert_eq!(body["applications"].as_array().map(Vec::len), Some(1));
        assert_eq!(body["applications"][0]["id"], 11);
        assert_eq!(body["applications"][0]["status"], "pending");

        let body: Value = test::call_and_read_body_json(
            &app,
            request(Method::GET, "/api/leave-applications").insert_header(auth.clone()).to_request(),
        )
        .await;
        assert_eq!(body["filter"], "all");

        let resp = test::call_service(
            &app,
            request(Method::GET, "/api/leave-applications?status=cancelled")
                .insert_header(auth)
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
