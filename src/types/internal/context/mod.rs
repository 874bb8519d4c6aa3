pub mod audit_context;
pub mod request_source;

pub use audit_context::{AuditContext, AuthenticatedIdentity};
pub use request_source::RequestSource;
