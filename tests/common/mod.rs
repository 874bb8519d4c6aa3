// Common test utilities for integration tests
#![allow(dead_code)]

use std::sync::Arc;

use migration::{AuditMigrator, LabMigrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use tempfile::TempDir;

use labtrack_backend::render::{CertificateRenderer, FsObjectStore, HtmlDocumentConverter};
use labtrack_backend::services::ReportManager;
use labtrack_backend::stores::{AuditTrailStore, ReportVersionStore, SampleStore};
use labtrack_backend::types::internal::sample::{NewSample, NewSampleTest};
use labtrack_backend::types::internal::AuditContext;

/// Creates a test app database with migrations applied
pub async fn setup_test_app_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    LabMigrator::up(&db, None)
        .await
        .expect("Failed to run lab migrations");

    db
}

/// Creates a test audit database with migrations applied
pub async fn setup_test_audit_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create audit database");

    AuditMigrator::up(&db, None)
        .await
        .expect("Failed to run audit migrations");

    db
}

/// Creates a test audit trail store backed by its own in-memory database
pub async fn create_test_audit_store() -> Arc<AuditTrailStore> {
    let audit_db = setup_test_audit_db().await;
    Arc::new(AuditTrailStore::new(audit_db))
}

/// Fully wired store/manager stack over in-memory databases and a
/// temp-directory document store.
pub struct TestHarness {
    pub app_db: DatabaseConnection,
    pub audit: Arc<AuditTrailStore>,
    pub samples: Arc<SampleStore>,
    pub manager: ReportManager,
    // Held so the document directory outlives the test
    pub docs_dir: TempDir,
}

pub async fn setup_harness() -> TestHarness {
    let app_db = setup_test_app_db().await;
    let audit = create_test_audit_store().await;
    let samples = Arc::new(SampleStore::new(app_db.clone(), audit.clone()));
    let docs_dir = tempfile::tempdir().expect("Failed to create document directory");

    let manager = ReportManager::new(
        app_db.clone(),
        samples.clone(),
        Arc::new(ReportVersionStore::new()),
        audit.clone(),
        Arc::new(CertificateRenderer),
        Arc::new(HtmlDocumentConverter),
        Arc::new(FsObjectStore::new(docs_dir.path())),
        HtmlDocumentConverter::CONTENT_TYPE,
    );

    TestHarness {
        app_db,
        audit,
        samples,
        manager,
        docs_dir,
    }
}

/// Context with a concrete lab analyst identity
pub fn analyst_ctx() -> AuditContext {
    AuditContext::for_system("test").with_actor("user-7", "analyst@lab.test")
}

pub fn water_sample() -> NewSample {
    NewSample {
        job_code: "JOB-2026-014".to_string(),
        name: "Effluent W-1".to_string(),
        matrix: "water".to_string(),
        temperature: Some(5.0),
        condition: Some("chilled".to_string()),
        received_at: Some("2026-03-01T08:30:00.000000Z".to_string()),
    }
}

pub fn ph_test() -> NewSampleTest {
    NewSampleTest {
        method: "pH".to_string(),
        result_value: Some(7.2),
        unit: None,
        comparator: "RANGE".to_string(),
        limit_low: Some(6.5),
        limit_high: Some(8.5),
    }
}

pub fn lead_test() -> NewSampleTest {
    NewSampleTest {
        method: "Pb-ICP".to_string(),
        result_value: Some(0.003),
        unit: Some("mg/L".to_string()),
        comparator: "LTE".to_string(),
        limit_low: None,
        limit_high: Some(0.01),
    }
}
