use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    /// An audit write was attempted without a usable actor identity.
    /// Never downgraded to a warning: the write must fail.
    #[error("Audit context missing: actor id and email are required for audit writes")]
    ContextMissing,

    #[error("Audit entry not found: {0}")]
    EntryNotFound(i64),

    #[error("Failed to serialize audit changes: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
