use crate::auth::auth::AuthUser;
use crate::client::{LeaveService, ServiceError};
use crate::leave::history::{ApplicationHistory, assemble};
use crate::model::leave_request::{ApplicationQuery, StatusFilter};
use actix_web::{HttpResponse, Responder, web};
use serde_json::json;
use tracing::instrument;

/* =========================
Leave application history
========================= */
/// The caller's leave applications filtered by status, with the dashboard
/// statistics and upcoming leave.
#[utoipa::path(
    get,
    path = "/api/leave-applications",
    params(ApplicationQuery),
    responses(
        (status = 200, description = "Application history", body = ApplicationHistory),
        (status = 400, description = "Unknown status filter", body = Object, example = json!({
            "message": "Unknown status filter: \"cancelled\""
        })),
        (status = 401, description = "Unauthorized or session expired"),
        (status = 502, description = "HRM backend unavailable")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave Applications"
)]
#[instrument(name = "list_leave_applications", skip(auth, service, query), fields(user_id = auth.user_id))]
pub async fn list_applications(
    auth: AuthUser,
    service: web::Data<dyn LeaveService>,
    query: web::Query<ApplicationQuery>,
) -> actix_web::Result<impl Responder> {
    let filter = match query.status.as_deref().map(str::trim) {
        None | Some("") => StatusFilter::All,
        Some(raw) => match raw.parse::<StatusFilter>() {
            Ok(filter) => filter,
            Err(_) => {
                return Ok(HttpResponse::BadRequest().json(json!({
                    "message": format!("Unknown status filter: {raw:?}")
                })));
            }
        },
    };

    let (dashboard, fetched) = futures::join!(
        service.fetch_dashboard(&auth.token),
        service.fetch_leave_applications(&auth.token, filter.status()),
    );

    match assemble(filter, dashboard, fetched) {
        Ok(history) => Ok(HttpResponse::Ok().json(history)),
        Err(ServiceError::Unauthorized) => Ok(HttpResponse::Unauthorized().json(json!({
            "message": ServiceError::Unauthorized.to_string()
        }))),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load leave application history");
            Ok(HttpResponse::BadGateway().json(json!({
                "message": format!("Failed to load leave applications: {e}")
            })))
        }
    }
}
