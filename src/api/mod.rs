// API layer - HTTP endpoints
pub mod audit;
pub mod health;
pub mod reports;
pub mod samples;

pub use audit::AuditApi;
pub use health::HealthApi;
pub use reports::ReportsApi;
pub use samples::SamplesApi;

use poem::Request;

use crate::capture::{propagate_best_effort, CaptureSink};
use crate::types::internal::AuditContext;

/// Build the per-request audit context and make it visible to storage-level
/// capture. Called at the beginning of every endpoint, before any business
/// logic runs. Propagation is best-effort and never fails the request.
pub(crate) async fn request_context(req: &Request, capture: &dyn CaptureSink) -> AuditContext {
    let ctx = AuditContext::from_request(req);
    propagate_best_effort(capture, &ctx).await;
    ctx
}
