// Database entities - SeaORM models
pub mod audit_entry;
pub mod report_version;
pub mod sample;
pub mod sample_test;
