use crate::auth::auth::AuthUser;
use crate::form::{DraftEdit, FormError, FormHandle, FormRegistry, FormView};
use crate::model::leave_request::LeaveApplication;
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct SubmitResponse {
    #[schema(example = "Leave application submitted")]
    pub message: String,
    pub application: Option<LeaveApplication>,
    pub form: FormView,
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

async fn open_form_of(registry: &FormRegistry, auth: &AuthUser) -> Result<Arc<FormHandle>, FormError> {
    registry.get(auth).await.ok_or(FormError::NotOpen)
}

/* =========================
Open leave form
========================= */
/// Open the caller's leave form (or return the one already open) and start
/// loading profile, leave types, holidays and allocations.
#[utoipa::path(
    post,
    path = "/api/leave-form",
    responses(
        (status = 200, description = "Form opened", body = FormView),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave Form"
)]
#[instrument(name = "open_leave_form", skip(auth, registry), fields(user_id = auth.user_id))]
pub async fn open_form(auth: AuthUser, registry: web::Data<FormRegistry>) -> actix_web::Result<impl Responder> {
    let form = registry.open(&auth).await;
    Ok(HttpResponse::Ok().json(form.view(today()).await))
}

/// Current state of the caller's leave form
#[utoipa::path(
    get,
    path = "/api/leave-form",
    responses(
        (status = 200, description = "Form state", body = FormView),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No form open", body = Object, example = json!({
            "message": "No leave form is open"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave Form"
)]
pub async fn get_form(auth: AuthUser, registry: web::Data<FormRegistry>) -> actix_web::Result<impl Responder> {
    let form = open_form_of(&registry, &auth).await?;
    Ok(HttpResponse::Ok().json(form.view(today()).await))
}

/// Discard the caller's leave form, cancelling any pending fetches
#[utoipa::path(
    delete,
    path = "/api/leave-form",
    responses(
        (status = 204, description = "Form discarded"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No form open")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave Form"
)]
pub async fn close_form(auth: AuthUser, registry: web::Data<FormRegistry>) -> actix_web::Result<impl Responder> {
    if registry.close(auth.user_id).await {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(FormError::NotOpen.into())
    }
}

/* =========================
Edit draft
========================= */
/// Swagger doc for edit_draft endpoint
#[utoipa::path(
    patch,
    path = "/api/leave-form/draft",
    request_body(
        content = DraftEdit,
        description = "Fields to change; omitted fields are kept, empty strings clear",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Draft updated", body = FormView),
        (status = 400, description = "Unparseable date or leave type", body = Object, example = json!({
            "message": "start_date is not a valid date: \"21/07/2025\""
        })),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No form open"),
        (status = 409, description = "Leave type selection disabled")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave Form"
)]
pub async fn edit_draft(
    auth: AuthUser,
    registry: web::Data<FormRegistry>,
    payload: web::Json<DraftEdit>,
) -> actix_web::Result<impl Responder> {
    let form = open_form_of(&registry, &auth).await?;
    form.edit(payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(form.view(today()).await))
}

/// Re-fetch leave allocations (retry after a failure)
#[utoipa::path(
    post,
    path = "/api/leave-form/allocations/refresh",
    responses(
        (status = 200, description = "Allocations reloaded; failures are reported in the form state", body = FormView),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No form open"),
        (status = 409, description = "Profile not loaded yet")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave Form"
)]
pub async fn refresh_allocations(
    auth: AuthUser,
    registry: web::Data<FormRegistry>,
) -> actix_web::Result<impl Responder> {
    let form = open_form_of(&registry, &auth).await?;
    form.refresh_allocations().await?;
    Ok(HttpResponse::Ok().json(form.view(today()).await))
}

/// Balances of every allocated leave type
#[utoipa::path(
    get,
    path = "/api/leave-form/balances",
    responses(
        (status = 200, description = "Leave balances", body = [crate::leave::LeaveBalance]),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No form open")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave Form"
)]
pub async fn list_balances(auth: AuthUser, registry: web::Data<FormRegistry>) -> actix_web::Result<impl Responder> {
    let form = open_form_of(&registry, &auth).await?;
    Ok(HttpResponse::Ok().json(form.view(today()).await.balances))
}

/* =========================
Submit leave application
========================= */
/// Swagger doc for submit endpoint
#[utoipa::path(
    post,
    path = "/api/leave-form/submit",
    responses(
        (status = 201, description = "Leave application created", body = SubmitResponse),
        (status = 401, description = "Unauthorized or session expired"),
        (status = 404, description = "No form open"),
        (status = 422, description = "Blocked by validation or rejected upstream", body = SubmitResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave Form"
)]
#[instrument(name = "submit_leave_form", skip(auth, registry), fields(user_id = auth.user_id))]
pub async fn submit(auth: AuthUser, registry: web::Data<FormRegistry>) -> actix_web::Result<impl Responder> {
    let form = open_form_of(&registry, &auth).await?;
    let day = today();

    match form.submit(day).await {
        Ok(created) => Ok(HttpResponse::Created().json(SubmitResponse {
            message: "Leave application submitted".to_string(),
            application: Some(created),
            form: form.view(day).await,
        })),
        Err(e @ (FormError::Blocked(_) | FormError::Rejected(_))) => {
            Ok(HttpResponse::UnprocessableEntity().json(SubmitResponse {
                message: e.to_string(),
                application: None,
                form: form.view(day).await,
            }))
        }
        Err(e) => Err(e.into()),
    }
}
