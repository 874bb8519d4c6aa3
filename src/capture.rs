//! Boundary adapter for storage-level change attribution.
//!
//! The database can attribute low-level writes to an actor when the actor's
//! identity is visible as transaction-scoped session configuration. This is
//! the only place any session-scoped mechanism lives; everything else in the
//! crate passes `AuditContext` explicitly.

use async_trait::async_trait;
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};

use crate::errors::InternalError;
use crate::types::internal::AuditContext;

/// Sink that makes the current actor visible to storage-level capture.
#[async_trait]
pub trait CaptureSink: Send + Sync {
    async fn propagate(&self, ctx: &AuditContext) -> Result<(), InternalError>;
}

/// Propagates actor identity into database session configuration.
///
/// Postgres gets `set_config(...)` calls that triggers can read via
/// `current_setting`. Sqlite has no session configuration; the sink is a
/// no-op there and capture happens entirely through the explicit audit API.
pub struct DbSessionSink {
    db: DatabaseConnection,
}

impl DbSessionSink {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CaptureSink for DbSessionSink {
    async fn propagate(&self, ctx: &AuditContext) -> Result<(), InternalError> {
        if self.db.get_database_backend() != DatabaseBackend::Postgres {
            return Ok(());
        }

        let stmt = Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            "SELECT set_config('labtrack.actor_id', $1, false), \
                    set_config('labtrack.actor_email', $2, false), \
                    set_config('labtrack.ip', $3, false), \
                    set_config('labtrack.user_agent', $4, false)",
            [
                ctx.actor_id.clone().into(),
                ctx.actor_email.clone().into(),
                ctx.ip.clone().into(),
                ctx.user_agent.clone().into(),
            ],
        );

        self.db
            .execute(stmt)
            .await
            .map_err(|e| InternalError::database("propagate_capture_context", e))?;

        Ok(())
    }
}

/// Best-effort propagation: a capture failure is reported, never fatal.
///
/// Skipped entirely for anonymous contexts so no storage-level write can be
/// attributed to a made-up actor.
pub async fn propagate_best_effort(sink: &dyn CaptureSink, ctx: &AuditContext) {
    if !ctx.has_actor() {
        return;
    }
    if let Err(e) = sink.propagate(ctx).await {
        tracing::error!("Capture context propagation failed: {}", e);
    }
}

#[cfg(test)]
pub mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Counts propagations; optionally fails every call.
    pub struct RecordingSink {
        pub calls: AtomicUsize,
        pub fail: bool,
    }

    impl RecordingSink {
        pub fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl CaptureSink for RecordingSink {
        async fn propagate(&self, _ctx: &AuditContext) -> Result<(), InternalError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(InternalError::parse("capture", "sink unavailable"));
            }
            Ok(())
        }
    }
}
