pub mod audit;
pub mod clock;
pub mod context;
pub mod report;
pub mod sample;
pub mod spec_rule;

pub use audit::{AuditAction, AuditGroup, AuditPage, AuditQuery, SubjectKind};
pub use context::{AuditContext, AuthenticatedIdentity, RequestSource};
pub use report::{ExportOutcome, PreviewOutcome, ReportSnapshot, ReportStatus, SnapshotLine};
