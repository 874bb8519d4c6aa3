mod common;

use std::sync::Arc;

use sea_orm::{Database, Set, SqlErr};
use uuid::Uuid;

use labtrack_backend::errors::internal::ReportError;
use labtrack_backend::errors::InternalError;
use labtrack_backend::render::{CertificateRenderer, FsObjectStore, HtmlDocumentConverter};
use labtrack_backend::services::ReportManager;
use labtrack_backend::stores::{AuditTrailStore, ReportVersionStore, SampleStore};
use labtrack_backend::types::db::report_version;
use labtrack_backend::types::internal::sample::SampleUpdate;
use labtrack_backend::types::internal::{AuditAction, AuditQuery, ReportStatus, SubjectKind};

use common::{analyst_ctx, lead_test, ph_test, setup_harness, water_sample};

#[tokio::test]
async fn test_first_export_creates_final_version_one() {
    let h = setup_harness().await;
    let ctx = analyst_ctx();

    let (sample, _) = h
        .samples
        .create_sample_with_tests(&ctx, water_sample(), vec![ph_test(), lead_test()])
        .await
        .unwrap();

    let outcome = h.manager.export_version(sample.id, &ctx).await.unwrap();
    assert_eq!(outcome.version, 1);
    assert_eq!(outcome.status, ReportStatus::Final);
    assert!(!outcome.document_key.is_empty());

    let versions = h.manager.list_versions(sample.id).await.unwrap();
    assert_eq!(versions.len(), 1);
    assert_eq!(versions[0].id, outcome.version_id);
    assert_eq!(versions[0].status, "FINAL");
    assert_eq!(versions[0].created_by_id, "user-7");
    assert!(versions[0].reported_at.is_some());

    let (_, bytes) = h.manager.download_document(outcome.version_id).await.unwrap();
    let html = String::from_utf8(bytes).unwrap();
    assert!(html.contains("Version 1"));
    assert!(html.contains("Effluent W-1"));
    assert!(html.contains("pH"));
}

#[tokio::test]
async fn test_sequential_exports_increment_and_keep_one_final() {
    let h = setup_harness().await;
    let ctx = analyst_ctx();

    let sample = h.samples.create_sample(&ctx, water_sample()).await.unwrap();

    for _ in 0..3 {
        h.manager.export_version(sample.id, &ctx).await.unwrap();
    }

    let versions = h.manager.list_versions(sample.id).await.unwrap();
    let numbers: Vec<i32> = versions.iter().map(|v| v.version).collect();
    assert_eq!(numbers, vec![3, 2, 1]);

    let finals: Vec<i32> = versions
        .iter()
        .filter(|v| v.status == "FINAL")
        .map(|v| v.version)
        .collect();
    assert_eq!(finals, vec![3]);
    assert!(versions
        .iter()
        .filter(|v| v.version < 3)
        .all(|v| v.status == "SUPERSEDED"));
}

#[tokio::test]
async fn test_exported_snapshot_and_document_are_immutable() {
    let h = setup_harness().await;
    let ctx = analyst_ctx();

    let (sample, _) = h
        .samples
        .create_sample_with_tests(&ctx, water_sample(), vec![ph_test()])
        .await
        .unwrap();

    let v1 = h.manager.export_version(sample.id, &ctx).await.unwrap();
    let v1_row = h.manager.get_version(v1.version_id).await.unwrap();
    let (_, v1_bytes) = h.manager.download_document(v1.version_id).await.unwrap();

    h.samples
        .update_sample(
            &ctx,
            sample.id,
            SampleUpdate {
                name: Some("Effluent W-1 (relabelled)".to_string()),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();
    let v2 = h.manager.export_version(sample.id, &ctx).await.unwrap();
    assert_eq!(v2.version, 2);

    let v1_after = h.manager.get_version(v1.version_id).await.unwrap();
    assert_eq!(v1_after.status, "SUPERSEDED");
    assert_eq!(v1_after.data_snapshot, v1_row.data_snapshot);
    assert_eq!(v1_after.rendered_snapshot, v1_row.rendered_snapshot);
    assert_eq!(v1_after.document_key, v1_row.document_key);

    // Repeated downloads of a version return byte-identical content
    let (_, v1_bytes_again) = h.manager.download_document(v1.version_id).await.unwrap();
    assert_eq!(v1_bytes_again, v1_bytes);
    let v1_html = String::from_utf8(v1_bytes_again).unwrap();
    assert!(v1_html.contains("Effluent W-1"));
    assert!(!v1_html.contains("relabelled"));

    let (_, v2_bytes) = h.manager.download_document(v2.version_id).await.unwrap();
    assert!(String::from_utf8(v2_bytes).unwrap().contains("relabelled"));
}

#[tokio::test]
async fn test_export_writes_one_audit_entry() {
    let h = setup_harness().await;
    let ctx = analyst_ctx();

    let sample = h.samples.create_sample(&ctx, water_sample()).await.unwrap();
    let outcome = h.manager.export_version(sample.id, &ctx).await.unwrap();

    let page = h
        .audit
        .query(&AuditQuery {
            subject_type: Some(SubjectKind::ReportVersion),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.entries[0].action, "CREATE");
    assert_eq!(page.entries[0].subject_id, outcome.version_id.to_string());
    assert_eq!(page.entries[0].actor_id, "user-7");

    // Snapshot columns appear as content digests, not dropped
    let changes: serde_json::Value = serde_json::from_str(&page.entries[0].changes).unwrap();
    assert!(changes["data_snapshot"]["new"]
        .as_str()
        .unwrap()
        .starts_with("sha256:"));
    assert!(changes["rendered_snapshot"]["new"]
        .as_str()
        .unwrap()
        .starts_with("sha256:"));
}

#[tokio::test]
async fn test_preview_persists_nothing() {
    let h = setup_harness().await;
    let ctx = analyst_ctx();

    let (sample, _) = h
        .samples
        .create_sample_with_tests(&ctx, water_sample(), vec![ph_test()])
        .await
        .unwrap();

    let preview = h.manager.preview_snapshot(sample.id, &ctx).await.unwrap();
    assert_eq!(preview.version, 1);
    assert!(preview.markup.contains("Version 1"));
    assert_eq!(preview.snapshot.sample_name, "Effluent W-1");

    // No version row, no audit entry, and the number is not consumed
    assert!(h.manager.list_versions(sample.id).await.unwrap().is_empty());
    let report_entries = h
        .audit
        .query(&AuditQuery {
            subject_type: Some(SubjectKind::ReportVersion),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(report_entries.total, 0);

    let again = h.manager.preview_snapshot(sample.id, &ctx).await.unwrap();
    assert_eq!(again.version, 1);
}

#[tokio::test]
async fn test_draft_then_finalize() {
    let h = setup_harness().await;
    let ctx = analyst_ctx();

    let (sample, _) = h
        .samples
        .create_sample_with_tests(&ctx, water_sample(), vec![ph_test()])
        .await
        .unwrap();

    let draft = h.manager.create_draft(sample.id, &ctx).await.unwrap();
    assert_eq!(draft.status, "DRAFT");
    assert_eq!(draft.version, 1);
    assert!(draft.document_key.is_none());
    assert!(draft.reported_at.is_none());

    let download = h.manager.download_document(draft.id).await;
    assert!(matches!(
        download,
        Err(InternalError::Report(ReportError::DocumentMissing))
    ));

    let finalized = h.manager.finalize_draft(draft.id, &ctx).await.unwrap();
    assert_eq!(finalized.status, "FINAL");
    assert!(finalized.document_key.is_some());
    assert!(finalized.reported_at.is_some());
    assert_eq!(finalized.reported_by_id.as_deref(), Some("user-7"));
    // The document derives from the snapshot frozen at draft time
    assert_eq!(finalized.rendered_snapshot, draft.rendered_snapshot);

    let (_, bytes) = h.manager.download_document(finalized.id).await.unwrap();
    assert_eq!(bytes, finalized.rendered_snapshot.as_bytes());

    let repeat = h.manager.finalize_draft(finalized.id, &ctx).await;
    assert!(matches!(
        repeat,
        Err(InternalError::Report(ReportError::NotDraft { .. }))
    ));

    let entries = h
        .audit
        .query(&AuditQuery {
            subject_type: Some(SubjectKind::ReportVersion),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(entries.total, 2);
    assert_eq!(entries.entries[0].action, "UPDATE");
    assert_eq!(entries.entries[1].action, "CREATE");
}

#[tokio::test]
async fn test_finalizing_a_draft_demotes_the_current_final() {
    let h = setup_harness().await;
    let ctx = analyst_ctx();

    let sample = h.samples.create_sample(&ctx, water_sample()).await.unwrap();

    let v1 = h.manager.export_version(sample.id, &ctx).await.unwrap();
    let draft = h.manager.create_draft(sample.id, &ctx).await.unwrap();
    assert_eq!(draft.version, 2);

    // The draft does not disturb the current FINAL until finalized
    let v1_row = h.manager.get_version(v1.version_id).await.unwrap();
    assert_eq!(v1_row.status, "FINAL");

    h.manager.finalize_draft(draft.id, &ctx).await.unwrap();

    let versions = h.manager.list_versions(sample.id).await.unwrap();
    assert_eq!(versions.len(), 2);
    assert_eq!(versions[0].version, 2);
    assert_eq!(versions[0].status, "FINAL");
    assert_eq!(versions[1].version, 1);
    assert_eq!(versions[1].status, "SUPERSEDED");
}

#[tokio::test]
async fn test_failed_audit_append_rolls_back_a_draft() {
    let h = setup_harness().await;
    let ctx = analyst_ctx();
    let sample = h.samples.create_sample(&ctx, water_sample()).await.unwrap();

    // Manager over the same app database, but with an audit database that
    // has no tables so every append fails
    let bare_audit = Arc::new(AuditTrailStore::new(
        Database::connect("sqlite::memory:")
            .await
            .expect("Failed to create bare audit database"),
    ));
    let docs_dir = tempfile::tempdir().unwrap();
    let broken = ReportManager::new(
        h.app_db.clone(),
        Arc::new(SampleStore::new(h.app_db.clone(), bare_audit.clone())),
        Arc::new(ReportVersionStore::new()),
        bare_audit,
        Arc::new(CertificateRenderer),
        Arc::new(HtmlDocumentConverter),
        Arc::new(FsObjectStore::new(docs_dir.path())),
        HtmlDocumentConverter::CONTENT_TYPE,
    );

    assert!(broken.create_draft(sample.id, &ctx).await.is_err());

    // No draft row survives the failed append
    assert!(h.manager.list_versions(sample.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_storage_rejects_a_second_final_row_per_subject() {
    let h = setup_harness().await;
    let store = ReportVersionStore::new();
    let subject = Uuid::new_v4();

    let final_row = |version: i32| report_version::ActiveModel {
        id: Set(Uuid::new_v4()),
        subject_id: Set(subject),
        version: Set(version),
        status: Set("FINAL".to_string()),
        data_snapshot: Set("{}".to_string()),
        rendered_snapshot: Set(String::new()),
        document_key: Set(None),
        reported_at: Set(None),
        created_by_id: Set("user-7".to_string()),
        reported_by_id: Set(None),
        approved_by_id: Set(None),
        created_at: Set("2026-03-01T00:00:00.000000Z".to_string()),
        updated_at: Set("2026-03-01T00:00:00.000000Z".to_string()),
    };

    store.insert(&h.app_db, final_row(1)).await.unwrap();

    // Distinct version numbers, same subject: the single-FINAL index decides
    let err = store.insert(&h.app_db, final_row(2)).await.unwrap_err();
    assert!(matches!(
        err.sql_err(),
        Some(SqlErr::UniqueConstraintViolation(_))
    ));
}

#[tokio::test]
async fn test_export_unknown_sample_is_not_found() {
    let h = setup_harness().await;
    let ctx = analyst_ctx();
    let missing = Uuid::new_v4();

    let result = h.manager.export_version(missing, &ctx).await;
    assert!(matches!(
        result,
        Err(InternalError::Report(ReportError::SubjectNotFound(id))) if id == missing
    ));

    let version = h.manager.get_version(missing).await;
    assert!(matches!(
        version,
        Err(InternalError::Report(ReportError::VersionNotFound(_)))
    ));
}

#[tokio::test]
async fn test_updates_after_export_audit_against_current_state() {
    // Export, then correct the storage temperature: the correction is
    // audited while the exported version keeps the old value.
    let h = setup_harness().await;
    let ctx = analyst_ctx();

    let sample = h.samples.create_sample(&ctx, water_sample()).await.unwrap();
    let v1 = h.manager.export_version(sample.id, &ctx).await.unwrap();

    h.samples
        .update_sample(
            &ctx,
            sample.id,
            SampleUpdate {
                temperature: Some(Some(8.0)),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();

    let updates = h
        .audit
        .query(&AuditQuery {
            subject_type: Some(SubjectKind::Sample),
            action: Some(AuditAction::Update),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(updates.total, 1);

    let (_, bytes) = h.manager.download_document(v1.version_id).await.unwrap();
    let html = String::from_utf8(bytes).unwrap();
    assert!(html.contains("Temperature: 5"));
}
