// Stores layer - Data access and repository pattern
pub mod audit_trail_store;
pub mod report_version_store;
pub mod sample_store;

pub use audit_trail_store::AuditTrailStore;
pub use report_version_store::ReportVersionStore;
pub use sample_store::SampleStore;
