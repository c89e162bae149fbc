use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("{field} is not a valid date: {value:?}")]
    InvalidDate { field: &'static str, value: String },

    #[error("Invalid leave type id: {0:?}")]
    InvalidLeaveType(String),

    #[error("Leave types could not be loaded; selection is disabled")]
    SelectionDisabled,

    #[error("No leave form is open")]
    NotOpen,

    #[error("Leave form was closed")]
    Closed,

    #[error("Employee profile is not loaded yet")]
    ProfileNotLoaded,

    #[error("Session expired, please sign in again")]
    SessionExpired,

    /// Submission refused before reaching the backend.
    #[error("Leave request cannot be submitted")]
    Blocked(Vec<String>),

    /// The backend refused the submission.
    #[error("{0}")]
    Rejected(String),
}

impl ResponseError for FormError {
    fn status_code(&self) -> StatusCode {
        match self {
            FormError::InvalidDate { .. } | FormError::InvalidLeaveType(_) => StatusCode::BAD_REQUEST,
            FormError::SelectionDisabled | FormError::ProfileNotLoaded => StatusCode::CONFLICT,
            FormError::NotOpen | FormError::Closed => StatusCode::NOT_FOUND,
            FormError::SessionExpired => StatusCode::UNAUTHORIZED,
            FormError::Blocked(_) | FormError::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            FormError::Blocked(errors) => json!({ "message": self.to_string(), "errors": errors }),
            _ => json!({ "message": self.to_string() }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}
