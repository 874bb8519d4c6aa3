use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Sample not found: {0}")]
    SubjectNotFound(Uuid),

    #[error("Report version not found: {0}")]
    VersionNotFound(Uuid),

    /// A concurrent export won the (subject_id, version) unique index.
    /// Surfaced only after one retry with a recomputed version number.
    #[error("Version conflict for sample {subject_id}: version {version} already exists")]
    VersionConflict { subject_id: Uuid, version: i32 },

    #[error("Report version is {status}, expected DRAFT")]
    NotDraft { status: String },

    #[error("Report version has no stored document")]
    DocumentMissing,

    #[error("Upstream failure during {stage}: {message}")]
    Upstream { stage: String, message: String },
}

impl ReportError {
    pub fn upstream(stage: &str, message: impl Into<String>) -> Self {
        ReportError::Upstream {
            stage: stage.to_string(),
            message: message.into(),
        }
    }
}
