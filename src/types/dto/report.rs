use poem_openapi::Object;
use uuid::Uuid;

use crate::types::db::report_version;
use crate::types::internal::ExportOutcome;

/// Result of an export or finalization
#[derive(Object, Debug)]
pub struct ExportResponse {
    pub version_id: Uuid,
    pub version: i32,
    pub status: String,
    /// Stable download reference into the object store
    pub document_key: String,
}

impl From<ExportOutcome> for ExportResponse {
    fn from(outcome: ExportOutcome) -> Self {
        Self {
            version_id: outcome.version_id,
            version: outcome.version,
            status: outcome.status.as_str().to_string(),
            document_key: outcome.document_key,
        }
    }
}

/// One report version in a listing
#[derive(Object, Debug)]
pub struct VersionSummary {
    pub id: Uuid,
    pub subject_id: Uuid,
    pub version: i32,
    pub status: String,
    pub document_key: Option<String>,
    pub reported_at: Option<String>,
    pub created_by_id: String,
    pub reported_by_id: Option<String>,
    pub created_at: String,
}

impl From<report_version::Model> for VersionSummary {
    fn from(m: report_version::Model) -> Self {
        Self {
            id: m.id,
            subject_id: m.subject_id,
            version: m.version,
            status: m.status,
            document_key: m.document_key,
            reported_at: m.reported_at,
            created_by_id: m.created_by_id,
            reported_by_id: m.reported_by_id,
            created_at: m.created_at,
        }
    }
}

/// Full version detail including the frozen snapshot
#[derive(Object, Debug)]
pub struct VersionDetail {
    pub id: Uuid,
    pub subject_id: Uuid,
    pub version: i32,
    pub status: String,
    /// JSON-encoded data snapshot, exactly as frozen at creation
    pub data_snapshot: String,
    pub document_key: Option<String>,
    pub reported_at: Option<String>,
    pub created_by_id: String,
    pub reported_by_id: Option<String>,
    pub approved_by_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<report_version::Model> for VersionDetail {
    fn from(m: report_version::Model) -> Self {
        Self {
            id: m.id,
            subject_id: m.subject_id,
            version: m.version,
            status: m.status,
            data_snapshot: m.data_snapshot,
            document_key: m.document_key,
            reported_at: m.reported_at,
            created_by_id: m.created_by_id,
            reported_by_id: m.reported_by_id,
            approved_by_id: m.approved_by_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Non-committal preview of the next export
#[derive(Object, Debug)]
pub struct PreviewResponse {
    /// Version number the next export would receive
    pub version: i32,
    /// Rendered markup for the current subject state
    pub markup: String,
}
