use migration::{AuditMigrator, LabMigrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};

use crate::config::BootstrapSettings;
use crate::errors::InternalError;

/// The app database holds lab records and report versions; the audit
/// database holds only the append-only ledger so it can be retained and
/// backed up on its own schedule.
pub struct DatabaseConnections {
    pub app: DatabaseConnection,
    pub audit: DatabaseConnection,
}

impl DatabaseConnections {
    /// Connect to both databases. Does NOT run migrations - call migrate()
    /// separately.
    pub async fn init(settings: &BootstrapSettings) -> Result<Self, InternalError> {
        tracing::info!("Connecting to app database");
        let app = Database::connect(settings.database_url())
            .await
            .map_err(|e| InternalError::database("connect_app_database", e))?;

        tracing::info!("Connecting to audit database");
        let audit = Database::connect(settings.audit_database_url())
            .await
            .map_err(|e| InternalError::database("connect_audit_database", e))?;

        Ok(Self { app, audit })
    }

    pub async fn migrate(&self) -> Result<(), InternalError> {
        LabMigrator::up(&self.app, None)
            .await
            .map_err(|e| InternalError::database("migrate_app_database", e))?;

        AuditMigrator::up(&self.audit, None)
            .await
            .map_err(|e| InternalError::database("migrate_audit_database", e))?;

        tracing::info!("Database migrations completed");
        Ok(())
    }
}
