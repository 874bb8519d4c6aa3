use poem_openapi::{payload::Json, ApiResponse};

use super::ApiErrorResponse;
use crate::errors::internal::{AuditError, InternalError, ReportError};

/// Report endpoint error types
#[derive(ApiResponse, Debug)]
pub enum ReportApiError {
    /// Sample or report version not found
    #[oai(status = 404)]
    NotFound(Json<ApiErrorResponse>),

    /// Lost a version-number race to a concurrent export
    #[oai(status = 409)]
    Conflict(Json<ApiErrorResponse>),

    /// Operation invalid for the version's current state
    #[oai(status = 422)]
    Validation(Json<ApiErrorResponse>),

    /// No usable actor context on an audited operation
    #[oai(status = 401)]
    ContextMissing(Json<ApiErrorResponse>),

    /// Renderer, converter or object store failed
    #[oai(status = 502)]
    Upstream(Json<ApiErrorResponse>),

    /// Internal server error
    #[oai(status = 500)]
    InternalError(Json<ApiErrorResponse>),
}

impl From<InternalError> for ReportApiError {
    fn from(err: InternalError) -> Self {
        match err {
            InternalError::Report(ReportError::SubjectNotFound(id)) => ReportApiError::NotFound(
                Json(ApiErrorResponse::new("sample_not_found", format!("Sample not found: {}", id), 404)),
            ),
            InternalError::Report(ReportError::VersionNotFound(id)) => ReportApiError::NotFound(
                Json(ApiErrorResponse::new("version_not_found", format!("Report version not found: {}", id), 404)),
            ),
            InternalError::Report(ReportError::VersionConflict { subject_id, version }) => {
                ReportApiError::Conflict(Json(ApiErrorResponse::new(
                    "version_conflict",
                    format!("Version {} already exists for sample {}", version, subject_id),
                    409,
                )))
            }
            InternalError::Report(ReportError::NotDraft { status }) => ReportApiError::Validation(
                Json(ApiErrorResponse::new("not_draft", format!("Report version is {}, expected DRAFT", status), 422)),
            ),
            InternalError::Report(ReportError::DocumentMissing) => ReportApiError::Validation(
                Json(ApiErrorResponse::new("document_missing", "Report version has no stored document", 422)),
            ),
            InternalError::Report(ReportError::Upstream { stage, message }) => ReportApiError::Upstream(
                Json(ApiErrorResponse::new("upstream_failure", format!("{} failed: {}", stage, message), 502)),
            ),
            InternalError::Audit(AuditError::ContextMissing) => ReportApiError::ContextMissing(
                Json(ApiErrorResponse::new("context_missing", "Actor identity required", 401)),
            ),
            other => {
                tracing::error!("Internal error in report endpoint: {:?}", other);
                ReportApiError::InternalError(Json(ApiErrorResponse::new(
                    "internal_error",
                    "Internal server error",
                    500,
                )))
            }
        }
    }
}
