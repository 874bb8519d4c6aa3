use poem_openapi::{payload::Json, ApiResponse};

use super::ApiErrorResponse;
use crate::errors::internal::{AuditError, InternalError};

/// Audit endpoint error types
#[derive(ApiResponse, Debug)]
pub enum AuditApiError {
    /// Audit entry not found
    #[oai(status = 404)]
    NotFound(Json<ApiErrorResponse>),

    /// Bad filter parameters
    #[oai(status = 400)]
    BadRequest(Json<ApiErrorResponse>),

    /// Internal server error
    #[oai(status = 500)]
    InternalError(Json<ApiErrorResponse>),
}

impl AuditApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AuditApiError::BadRequest(Json(ApiErrorResponse::new("bad_request", message, 400)))
    }
}

impl From<InternalError> for AuditApiError {
    fn from(err: InternalError) -> Self {
        match err {
            InternalError::Audit(AuditError::EntryNotFound(id)) => AuditApiError::NotFound(Json(
                ApiErrorResponse::new("entry_not_found", format!("Audit entry not found: {}", id), 404),
            )),
            other => {
                tracing::error!("Internal error in audit endpoint: {:?}", other);
                AuditApiError::InternalError(Json(ApiErrorResponse::new(
                    "internal_error",
                    "Internal server error",
                    500,
                )))
            }
        }
    }
}
