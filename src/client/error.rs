use std::collections::BTreeMap;

/// Failures talking to the upstream HRM backend.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ServiceError {
    #[error("Session expired or not signed in")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    /// Structured field validation failure (`errors: { field: [messages] }`).
    #[error("{message}")]
    Validation {
        message: String,
        errors: BTreeMap<String, Vec<String>>,
    },

    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound(_))
    }
}
