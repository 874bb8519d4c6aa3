use std::sync::Arc;

use chrono::{DateTime, Utc};
use poem_openapi::{param::Path, param::Query, payload::Json, OpenApi, Tags};

use crate::app_data::AppData;
use crate::errors::AuditApiError;
use crate::types::dto::audit::{AuditEntryDto, AuditGroupsResponse, AuditPageResponse};
use crate::types::internal::{AuditAction, AuditQuery, SubjectKind};

/// Read-only audit trail endpoints. The ledger has no mutating routes.
pub struct AuditApi {
    app_data: Arc<AppData>,
}

impl AuditApi {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self { app_data }
    }
}

#[derive(Tags)]
enum ApiTags {
    /// Audit trail retrieval
    Audit,
}

#[OpenApi(prefix_path = "/audit")]
impl AuditApi {
    /// Filtered, paginated audit entries, newest first
    #[oai(path = "/", method = "get", tag = "ApiTags::Audit")]
    #[allow(clippy::too_many_arguments)]
    async fn query(
        &self,
        subject_type: Query<Option<String>>,
        subject_id: Query<Option<String>>,
        actor_id: Query<Option<String>>,
        action: Query<Option<String>>,
        from: Query<Option<String>>,
        to: Query<Option<String>>,
        transaction_tag: Query<Option<String>>,
        page: Query<Option<u64>>,
        per_page: Query<Option<u64>>,
    ) -> Result<Json<AuditPageResponse>, AuditApiError> {
        let filter = build_query(
            subject_type.0,
            subject_id.0,
            actor_id.0,
            action.0,
            from.0,
            to.0,
            transaction_tag.0,
            page.0,
            per_page.0,
        )?;
        let result = self.app_data.audit_trail.query(&filter).await?;
        Ok(Json(result.into()))
    }

    /// Audit entries merged by transaction tag
    #[oai(path = "/grouped", method = "get", tag = "ApiTags::Audit")]
    #[allow(clippy::too_many_arguments)]
    async fn query_grouped(
        &self,
        subject_type: Query<Option<String>>,
        subject_id: Query<Option<String>>,
        actor_id: Query<Option<String>>,
        action: Query<Option<String>>,
        from: Query<Option<String>>,
        to: Query<Option<String>>,
        transaction_tag: Query<Option<String>>,
    ) -> Result<Json<AuditGroupsResponse>, AuditApiError> {
        let filter = build_query(
            subject_type.0,
            subject_id.0,
            actor_id.0,
            action.0,
            from.0,
            to.0,
            transaction_tag.0,
            None,
            None,
        )?;
        let groups = self.app_data.audit_trail.query_grouped(&filter).await?;
        Ok(Json(AuditGroupsResponse {
            groups: groups.into_iter().map(Into::into).collect(),
        }))
    }

    /// Fetch one audit entry by id
    #[oai(path = "/:id", method = "get", tag = "ApiTags::Audit")]
    async fn get_by_id(&self, id: Path<i64>) -> Result<Json<AuditEntryDto>, AuditApiError> {
        let entry = self.app_data.audit_trail.get_by_id(id.0).await?;
        Ok(Json(entry.into()))
    }
}

#[allow(clippy::too_many_arguments)]
fn build_query(
    subject_type: Option<String>,
    subject_id: Option<String>,
    actor_id: Option<String>,
    action: Option<String>,
    from: Option<String>,
    to: Option<String>,
    transaction_tag: Option<String>,
    page: Option<u64>,
    per_page: Option<u64>,
) -> Result<AuditQuery, AuditApiError> {
    let subject_type = subject_type
        .map(|s| {
            SubjectKind::parse(&s)
                .ok_or_else(|| AuditApiError::bad_request(format!("Unknown subject type: {}", s)))
        })
        .transpose()?;

    let action = action
        .map(|s| {
            AuditAction::parse(&s)
                .ok_or_else(|| AuditApiError::bad_request(format!("Unknown action: {}", s)))
        })
        .transpose()?;

    let from = from.map(|s| parse_instant(&s, "from")).transpose()?;
    let to = to.map(|s| parse_instant(&s, "to")).transpose()?;

    Ok(AuditQuery {
        subject_type,
        subject_id,
        actor_id,
        action,
        from,
        to,
        transaction_tag,
        page: page.unwrap_or(1),
        per_page: per_page.unwrap_or(0),
    })
}

fn parse_instant(s: &str, name: &str) -> Result<DateTime<Utc>, AuditApiError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| AuditApiError::bad_request(format!("Invalid {} timestamp: {}", name, s)))
}
