use std::sync::Arc;

use sea_orm::{DatabaseConnection, Set, SqlErr, TransactionTrait};
use uuid::Uuid;

use crate::errors::internal::{DatabaseError, ReportError};
use crate::errors::InternalError;
use crate::render::{DocumentConverter, ObjectStore, ReportRenderer};
use crate::stores::{AuditTrailStore, ReportVersionStore, SampleStore};
use crate::types::db::report_version;
use crate::types::internal::clock::now_rfc3339;
use crate::types::internal::{
    AuditContext, ExportOutcome, PreviewOutcome, ReportSnapshot, ReportStatus, SubjectKind,
};

/// Orchestrates versioned certificate exports.
///
/// An export freezes the subject's state into a snapshot, renders and stores
/// the document, then demotes the previous FINAL and inserts the new one in
/// a single transaction. The unique index on (subject_id, version) settles
/// concurrent exports; the loser retries once with a recomputed number.
pub struct ReportManager {
    db: DatabaseConnection,
    samples: Arc<SampleStore>,
    versions: Arc<ReportVersionStore>,
    audit: Arc<AuditTrailStore>,
    renderer: Arc<dyn ReportRenderer>,
    converter: Arc<dyn DocumentConverter>,
    objects: Arc<dyn ObjectStore>,
    content_type: String,
}

impl ReportManager {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        db: DatabaseConnection,
        samples: Arc<SampleStore>,
        versions: Arc<ReportVersionStore>,
        audit: Arc<AuditTrailStore>,
        renderer: Arc<dyn ReportRenderer>,
        converter: Arc<dyn DocumentConverter>,
        objects: Arc<dyn ObjectStore>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            db,
            samples,
            versions,
            audit,
            renderer,
            converter,
            objects,
            content_type: content_type.into(),
        }
    }

    /// Export a new FINAL version for a subject.
    pub async fn export_version(
        &self,
        subject_id: Uuid,
        ctx: &AuditContext,
    ) -> Result<ExportOutcome, InternalError> {
        let (sample, tests) = self.samples.load_with_tests(subject_id).await?;

        let mut attempt = 0;
        loop {
            let next = self.versions.highest_version(&self.db, subject_id).await? + 1;

            let snapshot = ReportSnapshot::from_subject(&sample, &tests, next, &ctx.actor_id);
            let markup = self.renderer.render(&snapshot)?;
            let bytes = self.converter.convert(&markup).await?;
            let key = document_key(subject_id, next);
            self.objects.put(&key, &bytes, &self.content_type).await?;

            let snapshot_json = serde_json::to_string(&snapshot)
                .map_err(|e| InternalError::parse("report_snapshot", e.to_string()))?;

            let now = now_rfc3339();
            let row = report_version::ActiveModel {
                id: Set(Uuid::new_v4()),
                subject_id: Set(subject_id),
                version: Set(next),
                status: Set(ReportStatus::Final.as_str().to_string()),
                data_snapshot: Set(snapshot_json),
                rendered_snapshot: Set(markup),
                document_key: Set(Some(key.clone())),
                reported_at: Set(Some(now.clone())),
                created_by_id: Set(ctx.actor_id.clone()),
                reported_by_id: Set(Some(ctx.actor_id.clone())),
                approved_by_id: Set(None),
                created_at: Set(now.clone()),
                updated_at: Set(now),
            };

            // Demote and insert must commit or fail together: a reader must
            // never observe zero or two FINAL versions for this subject.
            let txn = self
                .db
                .begin()
                .await
                .map_err(|e| DatabaseError::TransactionBegin { source: e })?;

            self.versions.demote_finals(&txn, subject_id).await?;

            match self.versions.insert(&txn, row).await {
                Ok(inserted) => {
                    // Audit append is a correctness requirement: failure here
                    // rolls the transaction back with it.
                    let entry = self
                        .audit
                        .log_create(
                            ctx,
                            SubjectKind::ReportVersion,
                            &inserted.id.to_string(),
                            &inserted.field_map(),
                            None,
                        )
                        .await?;

                    // The append is already durable on the audit connection;
                    // a failed commit here orphans that ledger entry.
                    txn.commit().await.map_err(|e| {
                        tracing::error!(
                            "Commit failed after audit append; entry {} refers to unpersisted version {}",
                            entry.id,
                            inserted.id
                        );
                        DatabaseError::TransactionCommit { source: e }
                    })?;

                    tracing::info!(
                        "Exported certificate version {} for sample {}",
                        inserted.version,
                        subject_id
                    );

                    return Ok(ExportOutcome {
                        version_id: inserted.id,
                        version: inserted.version,
                        status: ReportStatus::Final,
                        document_key: key,
                    });
                }
                Err(e) if is_unique_violation(&e) => {
                    let _ = txn.rollback().await;
                    if attempt == 0 {
                        tracing::warn!(
                            "Version {} for sample {} lost a concurrent export, retrying",
                            next,
                            subject_id
                        );
                        attempt += 1;
                        continue;
                    }
                    return Err(ReportError::VersionConflict {
                        subject_id,
                        version: next,
                    }
                    .into());
                }
                Err(e) => {
                    let _ = txn.rollback().await;
                    return Err(InternalError::database("insert_report_version", e));
                }
            }
        }
    }

    /// Create a DRAFT version: snapshot and render now, document later at
    /// finalization. Does not disturb the current FINAL.
    pub async fn create_draft(
        &self,
        subject_id: Uuid,
        ctx: &AuditContext,
    ) -> Result<report_version::Model, InternalError> {
        let (sample, tests) = self.samples.load_with_tests(subject_id).await?;
        let next = self.versions.highest_version(&self.db, subject_id).await? + 1;

        let snapshot = ReportSnapshot::from_subject(&sample, &tests, next, &ctx.actor_id);
        let markup = self.renderer.render(&snapshot)?;
        let snapshot_json = serde_json::to_string(&snapshot)
            .map_err(|e| InternalError::parse("report_snapshot", e.to_string()))?;

        let now = now_rfc3339();
        let row = report_version::ActiveModel {
            id: Set(Uuid::new_v4()),
            subject_id: Set(subject_id),
            version: Set(next),
            status: Set(ReportStatus::Draft.as_str().to_string()),
            data_snapshot: Set(snapshot_json),
            rendered_snapshot: Set(markup),
            document_key: Set(None),
            reported_at: Set(None),
            created_by_id: Set(ctx.actor_id.clone()),
            reported_by_id: Set(None),
            approved_by_id: Set(None),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        };

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| DatabaseError::TransactionBegin { source: e })?;

        let inserted = match self.versions.insert(&txn, row).await {
            Ok(inserted) => inserted,
            Err(e) if is_unique_violation(&e) => {
                let _ = txn.rollback().await;
                return Err(ReportError::VersionConflict {
                    subject_id,
                    version: next,
                }
                .into());
            }
            Err(e) => {
                let _ = txn.rollback().await;
                return Err(InternalError::database("insert_draft_version", e));
            }
        };

        // A failed append must not leave a draft row behind.
        self.audit
            .log_create(
                ctx,
                SubjectKind::ReportVersion,
                &inserted.id.to_string(),
                &inserted.field_map(),
                None,
            )
            .await?;

        txn.commit()
            .await
            .map_err(|e| DatabaseError::TransactionCommit { source: e })?;

        Ok(inserted)
    }

    /// Finalize a DRAFT version: generate and store its document if missing,
    /// demote older FINALs, flip to FINAL.
    pub async fn finalize_draft(
        &self,
        version_id: Uuid,
        ctx: &AuditContext,
    ) -> Result<report_version::Model, InternalError> {
        let draft = self.versions.get(&self.db, version_id).await?;
        if draft.status != ReportStatus::Draft.as_str() {
            return Err(ReportError::NotDraft {
                status: draft.status,
            }
            .into());
        }

        // The document derives from the frozen rendered snapshot, never from
        // the subject's current state.
        let new_key = match &draft.document_key {
            Some(_) => None,
            None => {
                let bytes = self.converter.convert(&draft.rendered_snapshot).await?;
                let key = document_key(draft.subject_id, draft.version);
                self.objects.put(&key, &bytes, &self.content_type).await?;
                Some(key)
            }
        };

        let subject_id = draft.subject_id;
        let draft_version = draft.version;
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| DatabaseError::TransactionBegin { source: e })?;

        // The status may have moved between the first read and this
        // transaction; the flip must be decided on the row it will update.
        let current = self.versions.get(&txn, version_id).await?;
        if current.status != ReportStatus::Draft.as_str() {
            let _ = txn.rollback().await;
            return Err(ReportError::NotDraft {
                status: current.status,
            }
            .into());
        }
        let old_fields = current.field_map();

        self.versions.demote_finals(&txn, subject_id).await?;
        let finalized = match self
            .versions
            .mark_final(&txn, current, &ctx.actor_id, new_key)
            .await
        {
            Ok(finalized) => finalized,
            // The single-FINAL partial index caught a concurrent writer
            Err(e) if is_unique_violation(&e) => {
                let _ = txn.rollback().await;
                return Err(ReportError::VersionConflict {
                    subject_id,
                    version: draft_version,
                }
                .into());
            }
            Err(e) => {
                let _ = txn.rollback().await;
                return Err(InternalError::database("finalize_report_version", e));
            }
        };

        let entry = self
            .audit
            .log_update(
                ctx,
                SubjectKind::ReportVersion,
                &finalized.id.to_string(),
                &old_fields,
                &finalized.field_map(),
                None,
            )
            .await?;

        txn.commit().await.map_err(|e| {
            if let Some(entry) = &entry {
                tracing::error!(
                    "Commit failed after audit append; entry {} refers to unfinalized version {}",
                    entry.id,
                    finalized.id
                );
            }
            DatabaseError::TransactionCommit { source: e }
        })?;

        tracing::info!(
            "Finalized certificate version {} for sample {}",
            finalized.version,
            subject_id
        );

        Ok(finalized)
    }

    /// All versions for a subject, newest first.
    pub async fn list_versions(
        &self,
        subject_id: Uuid,
    ) -> Result<Vec<report_version::Model>, InternalError> {
        self.versions.list(&self.db, subject_id).await
    }

    /// One version by id.
    pub async fn get_version(&self, id: Uuid) -> Result<report_version::Model, InternalError> {
        self.versions.get(&self.db, id).await
    }

    /// Fetch the stored document bytes for a version.
    ///
    /// Byte-identical on every call: the key points at immutable content.
    pub async fn download_document(
        &self,
        version_id: Uuid,
    ) -> Result<(report_version::Model, Vec<u8>), InternalError> {
        let version = self.versions.get(&self.db, version_id).await?;
        let key = version
            .document_key
            .clone()
            .ok_or(ReportError::DocumentMissing)?;
        let bytes = self.objects.get(&key).await?;
        Ok((version, bytes))
    }

    /// Non-committal render of the subject's current state.
    ///
    /// No version is allocated, nothing is stored, no audit entry is written.
    pub async fn preview_snapshot(
        &self,
        subject_id: Uuid,
        ctx: &AuditContext,
    ) -> Result<PreviewOutcome, InternalError> {
        let (sample, tests) = self.samples.load_with_tests(subject_id).await?;
        let next = self.versions.highest_version(&self.db, subject_id).await? + 1;

        let snapshot = ReportSnapshot::from_subject(&sample, &tests, next, &ctx.actor_id);
        let markup = self.renderer.render(&snapshot)?;

        Ok(PreviewOutcome {
            version: next,
            snapshot,
            markup,
        })
    }
}

/// Deterministic storage key: subject identity, version, uniqueness suffix.
/// The suffix keeps a retried export attempt from colliding with orphaned
/// bytes of a failed one.
fn document_key(subject_id: Uuid, version: i32) -> String {
    format!(
        "certificates/{}/v{}-{}.html",
        subject_id,
        version,
        Uuid::new_v4().simple()
    )
}

fn is_unique_violation(err: &sea_orm::DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
