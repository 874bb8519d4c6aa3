mod common;

use std::sync::Arc;

use sea_orm::{Database, EntityTrait};
use serde_json::{json, Value};
use uuid::Uuid;

use labtrack_backend::errors::internal::ReportError;
use labtrack_backend::errors::InternalError;
use labtrack_backend::stores::{AuditTrailStore, SampleStore};
use labtrack_backend::types::db::sample;
use labtrack_backend::types::internal::sample::{SampleTestUpdate, SampleUpdate};
use labtrack_backend::types::internal::{AuditAction, AuditQuery, SubjectKind};

use common::{analyst_ctx, lead_test, ph_test, setup_harness, setup_test_app_db, water_sample};

/// Audit store over a database with no tables, so every append fails
async fn failing_audit_store() -> Arc<AuditTrailStore> {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create bare audit database");
    Arc::new(AuditTrailStore::new(db))
}

#[tokio::test]
async fn test_create_sample_with_tests_shares_one_transaction_tag() {
    let h = setup_harness().await;
    let ctx = analyst_ctx();

    let (sample, tests) = h
        .samples
        .create_sample_with_tests(&ctx, water_sample(), vec![ph_test(), lead_test()])
        .await
        .unwrap();
    assert_eq!(tests.len(), 2);

    let groups = h.audit.query_grouped(&AuditQuery::default()).await.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].entries.len(), 3);

    let tag = groups[0].entries[0].transaction_tag.clone().unwrap();
    assert!(groups[0]
        .entries
        .iter()
        .all(|e| e.transaction_tag.as_deref() == Some(tag.as_str())));

    // One CREATE for the sample, one per test
    let sample_creates = groups[0]
        .entries
        .iter()
        .filter(|e| e.subject_type == "Sample" && e.subject_id == sample.id.to_string())
        .count();
    assert_eq!(sample_creates, 1);
}

#[tokio::test]
async fn test_temperature_update_audits_old_and_new_value() {
    let h = setup_harness().await;
    let ctx = analyst_ctx();

    let sample = h.samples.create_sample(&ctx, water_sample()).await.unwrap();
    assert_eq!(sample.temperature, Some(5.0));

    let updated = h
        .samples
        .update_sample(
            &ctx,
            sample.id,
            SampleUpdate {
                temperature: Some(Some(8.0)),
                ..Default::default()
            },
            Some("storage excursion review".to_string()),
        )
        .await
        .unwrap();
    assert_eq!(updated.temperature, Some(8.0));

    let page = h
        .audit
        .query(&AuditQuery {
            subject_type: Some(SubjectKind::Sample),
            action: Some(AuditAction::Update),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.total, 1);

    let entry = &page.entries[0];
    assert_eq!(entry.actor_id, "user-7");
    assert_eq!(entry.subject_id, sample.id.to_string());
    assert_eq!(entry.reason.as_deref(), Some("storage excursion review"));

    let changes: Value = serde_json::from_str(&entry.changes).unwrap();
    let map = changes.as_object().unwrap();
    // updated_at changed too but is excluded as a system field
    assert_eq!(map.len(), 1);
    assert_eq!(changes["temperature"]["old"], json!(5.0));
    assert_eq!(changes["temperature"]["new"], json!(8.0));
}

#[tokio::test]
async fn test_noop_sample_update_leaves_no_trace() {
    let h = setup_harness().await;
    let ctx = analyst_ctx();

    let sample = h.samples.create_sample(&ctx, water_sample()).await.unwrap();

    h.samples
        .update_sample(&ctx, sample.id, SampleUpdate::default(), None)
        .await
        .unwrap();

    let updates = h
        .audit
        .query(&AuditQuery {
            action: Some(AuditAction::Update),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(updates.total, 0);
}

#[tokio::test]
async fn test_out_of_spec_recomputed_on_result_update() {
    let h = setup_harness().await;
    let ctx = analyst_ctx();

    let sample = h.samples.create_sample(&ctx, water_sample()).await.unwrap();
    let test = h.samples.create_test(&ctx, sample.id, ph_test()).await.unwrap();
    assert!(!test.out_of_spec);

    let updated = h
        .samples
        .update_test(
            &ctx,
            test.id,
            SampleTestUpdate {
                result_value: Some(Some(9.1)),
                ..Default::default()
            },
            Some("re-read after calibration".to_string()),
        )
        .await
        .unwrap();
    assert_eq!(updated.result_value, Some(9.1));
    assert!(updated.out_of_spec);
}

#[tokio::test]
async fn test_delete_test_records_full_prior_state() {
    let h = setup_harness().await;
    let ctx = analyst_ctx();

    let sample = h.samples.create_sample(&ctx, water_sample()).await.unwrap();
    let test = h.samples.create_test(&ctx, sample.id, ph_test()).await.unwrap();

    h.samples
        .delete_test(&ctx, test.id, Some("logged against wrong sample".to_string()))
        .await
        .unwrap();

    let deletes = h
        .audit
        .query(&AuditQuery {
            action: Some(AuditAction::Delete),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(deletes.total, 1);

    let entry = &deletes.entries[0];
    assert_eq!(entry.subject_type, "SampleTest");
    assert_eq!(entry.subject_id, test.id.to_string());

    let changes: Value = serde_json::from_str(&entry.changes).unwrap();
    assert_eq!(changes["method"]["old"], json!("pH"));
    assert_eq!(changes["method"]["new"], Value::Null);
    assert_eq!(changes["result_value"]["old"], json!(7.2));
}

#[tokio::test]
async fn test_failed_audit_append_rolls_back_a_create() {
    let app_db = setup_test_app_db().await;
    let samples = SampleStore::new(app_db.clone(), failing_audit_store().await);
    let ctx = analyst_ctx();

    let result = samples.create_sample(&ctx, water_sample()).await;
    assert!(result.is_err());

    // The failed append must not leave an unrecorded mutation behind
    let rows = sample::Entity::find().all(&app_db).await.unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_failed_audit_append_rolls_back_an_update() {
    let h = setup_harness().await;
    let ctx = analyst_ctx();
    let created = h.samples.create_sample(&ctx, water_sample()).await.unwrap();

    let broken = SampleStore::new(h.app_db.clone(), failing_audit_store().await);
    let result = broken
        .update_sample(
            &ctx,
            created.id,
            SampleUpdate {
                temperature: Some(Some(8.0)),
                ..Default::default()
            },
            None,
        )
        .await;
    assert!(result.is_err());

    let row = sample::Entity::find_by_id(created.id)
        .one(&h.app_db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.temperature, Some(5.0));
}

#[tokio::test]
async fn test_failed_audit_append_rolls_back_a_delete() {
    let h = setup_harness().await;
    let ctx = analyst_ctx();
    let created = h.samples.create_sample(&ctx, water_sample()).await.unwrap();
    let test = h.samples.create_test(&ctx, created.id, ph_test()).await.unwrap();

    let broken = SampleStore::new(h.app_db.clone(), failing_audit_store().await);
    assert!(broken.delete_test(&ctx, test.id, None).await.is_err());

    let (_, tests) = h.samples.load_with_tests(created.id).await.unwrap();
    assert_eq!(tests.len(), 1);
}

#[tokio::test]
async fn test_update_unknown_sample_is_not_found() {
    let h = setup_harness().await;
    let ctx = analyst_ctx();
    let missing = Uuid::new_v4();

    let result = h
        .samples
        .update_sample(&ctx, missing, SampleUpdate::default(), None)
        .await;

    assert!(matches!(
        result,
        Err(InternalError::Report(ReportError::SubjectNotFound(id))) if id == missing
    ));
}

#[tokio::test]
async fn test_unknown_comparator_is_rejected() {
    let h = setup_harness().await;
    let ctx = analyst_ctx();

    let sample = h.samples.create_sample(&ctx, water_sample()).await.unwrap();
    let mut bad = ph_test();
    bad.comparator = ">=".to_string();

    let result = h.samples.create_test(&ctx, sample.id, bad).await;
    assert!(matches!(result, Err(InternalError::Parse { .. })));
}
