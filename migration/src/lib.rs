pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_lab_schema;
mod m20260301_000002_create_report_versions;
mod m20260301_000003_create_audit_entries;

pub struct LabMigrator;

#[async_trait::async_trait]
impl MigratorTrait for LabMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_lab_schema::Migration),
            Box::new(m20260301_000002_create_report_versions::Migration),
        ]
    }
}

pub struct AuditMigrator;

#[async_trait::async_trait]
impl MigratorTrait for AuditMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000003_create_audit_entries::Migration),
        ]
    }
}
