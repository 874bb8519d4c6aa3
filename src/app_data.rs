use std::sync::Arc;

use crate::capture::{CaptureSink, DbSessionSink};
use crate::config::database::DatabaseConnections;
use crate::errors::InternalError;
use crate::render::{CertificateRenderer, FsObjectStore, HtmlDocumentConverter};
use crate::services::ReportManager;
use crate::stores::{AuditTrailStore, ReportVersionStore, SampleStore};

/// Centralized application data following the main-owned stores pattern
///
/// All dependencies are created once in main.rs and shared across endpoints.
pub struct AppData {
    pub connections: DatabaseConnections,
    pub audit_trail: Arc<AuditTrailStore>,
    pub samples: Arc<SampleStore>,
    pub versions: Arc<ReportVersionStore>,
    pub report_manager: Arc<ReportManager>,
    pub capture: Arc<dyn CaptureSink>,
}

impl AppData {
    /// Initialize all application data
    ///
    /// Database connections should be initialized and migrated before calling
    /// this. The audit trail store is created first since the other stores
    /// depend on it for logging.
    pub async fn init(
        connections: DatabaseConnections,
        document_store_dir: &str,
    ) -> Result<Self, InternalError> {
        tracing::info!("Initializing AppData");

        let audit_trail = Arc::new(AuditTrailStore::new(connections.audit.clone()));
        let samples = Arc::new(SampleStore::new(
            connections.app.clone(),
            audit_trail.clone(),
        ));
        let versions = Arc::new(ReportVersionStore::new());
        let capture: Arc<dyn CaptureSink> = Arc::new(DbSessionSink::new(connections.app.clone()));

        let report_manager = Arc::new(ReportManager::new(
            connections.app.clone(),
            samples.clone(),
            versions.clone(),
            audit_trail.clone(),
            Arc::new(CertificateRenderer),
            Arc::new(HtmlDocumentConverter),
            Arc::new(FsObjectStore::new(document_store_dir)),
            HtmlDocumentConverter::CONTENT_TYPE,
        ));

        tracing::info!("AppData initialization complete");

        Ok(Self {
            connections,
            audit_trail,
            samples,
            versions,
            report_manager,
            capture,
        })
    }
}
