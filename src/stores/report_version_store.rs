use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::errors::internal::ReportError;
use crate::errors::InternalError;
use crate::types::db::report_version::{self, Entity as ReportVersions};
use crate::types::internal::clock::now_rfc3339;
use crate::types::internal::ReportStatus;

/// Repository for report version rows.
///
/// Stateless: every method takes the connection so demote+insert can run
/// inside the caller's transaction (the manager owns transaction scope).
pub struct ReportVersionStore {}

impl ReportVersionStore {
    pub fn new() -> Self {
        Self {}
    }

    /// Highest version number recorded for a subject, 0 if none.
    pub async fn highest_version(
        &self,
        conn: &impl ConnectionTrait,
        subject_id: Uuid,
    ) -> Result<i32, InternalError> {
        let latest = ReportVersions::find()
            .filter(report_version::Column::SubjectId.eq(subject_id))
            .order_by_desc(report_version::Column::Version)
            .one(conn)
            .await
            .map_err(|e| InternalError::database("highest_report_version", e))?;

        Ok(latest.map(|v| v.version).unwrap_or(0))
    }

    /// All versions for a subject, newest first.
    pub async fn list(
        &self,
        conn: &impl ConnectionTrait,
        subject_id: Uuid,
    ) -> Result<Vec<report_version::Model>, InternalError> {
        ReportVersions::find()
            .filter(report_version::Column::SubjectId.eq(subject_id))
            .order_by_desc(report_version::Column::Version)
            .all(conn)
            .await
            .map_err(|e| InternalError::database("list_report_versions", e))
    }

    /// Fetch one version by id.
    pub async fn get(
        &self,
        conn: &impl ConnectionTrait,
        id: Uuid,
    ) -> Result<report_version::Model, InternalError> {
        ReportVersions::find_by_id(id)
            .one(conn)
            .await
            .map_err(|e| InternalError::database("get_report_version", e))?
            .ok_or_else(|| ReportError::VersionNotFound(id).into())
    }

    /// Demote every currently-FINAL version of the subject to SUPERSEDED.
    ///
    /// Must run in the same transaction as the insertion of the replacement
    /// FINAL row; committing a demotion without a new FINAL would leave the
    /// subject with zero current versions.
    pub async fn demote_finals(
        &self,
        conn: &impl ConnectionTrait,
        subject_id: Uuid,
    ) -> Result<u64, InternalError> {
        let result = ReportVersions::update_many()
            .col_expr(
                report_version::Column::Status,
                sea_orm::sea_query::Expr::value(ReportStatus::Superseded.as_str()),
            )
            .col_expr(
                report_version::Column::UpdatedAt,
                sea_orm::sea_query::Expr::value(now_rfc3339()),
            )
            .filter(report_version::Column::SubjectId.eq(subject_id))
            .filter(report_version::Column::Status.eq(ReportStatus::Final.as_str()))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("demote_final_versions", e))?;

        Ok(result.rows_affected)
    }

    /// Insert a new version row.
    ///
    /// Returns the raw `DbErr` so the caller can distinguish a unique-index
    /// collision on (subject_id, version) from other failures and retry.
    pub async fn insert(
        &self,
        conn: &impl ConnectionTrait,
        row: report_version::ActiveModel,
    ) -> Result<report_version::Model, sea_orm::DbErr> {
        row.insert(conn).await
    }

    /// Flip a DRAFT row to FINAL, stamping the reporter and, when given,
    /// the write-once document key. Snapshot columns are never touched.
    ///
    /// Returns the raw `DbErr` so the caller can distinguish a collision on
    /// the single-FINAL partial index from other failures.
    pub async fn mark_final(
        &self,
        conn: &impl ConnectionTrait,
        version: report_version::Model,
        reported_by: &str,
        document_key: Option<String>,
    ) -> Result<report_version::Model, sea_orm::DbErr> {
        let mut active: report_version::ActiveModel = version.into();
        active.status = Set(ReportStatus::Final.as_str().to_string());
        active.reported_at = Set(Some(now_rfc3339()));
        active.reported_by_id = Set(Some(reported_by.to_string()));
        if let Some(key) = document_key {
            active.document_key = Set(Some(key));
        }
        active.updated_at = Set(now_rfc3339());

        active.update(conn).await
    }
}

impl Default for ReportVersionStore {
    fn default() -> Self {
        Self::new()
    }
}
