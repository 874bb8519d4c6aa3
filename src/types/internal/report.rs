use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::db::{sample, sample_test};
use crate::types::internal::clock::now_rfc3339;

/// Lifecycle state of a report version
///
/// DRAFT -> FINAL -> SUPERSEDED. SUPERSEDED is permanent; FINAL holds until
/// a newer version for the same subject becomes FINAL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStatus {
    Draft,
    Final,
    Superseded,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Final => "FINAL",
            Self::Superseded => "SUPERSEDED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "DRAFT" => Some(Self::Draft),
            "FINAL" => Some(Self::Final),
            "SUPERSEDED" => Some(Self::Superseded),
            _ => None,
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Frozen data used to render one certificate version.
///
/// Built from the subject's state at export time and never recomputed;
/// the rendered markup and stored document both derive from this snapshot
/// and only from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSnapshot {
    pub subject_id: Uuid,
    pub version: i32,
    pub job_code: String,
    pub sample_name: String,
    pub matrix: String,
    pub temperature: Option<f64>,
    pub condition: Option<String>,
    pub received_at: Option<String>,
    pub generated_at: String,
    pub generated_by: String,
    pub lines: Vec<SnapshotLine>,
}

/// One test line inside a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotLine {
    pub method: String,
    pub result_value: Option<f64>,
    pub unit: Option<String>,
    pub comparator: String,
    pub limit_low: Option<f64>,
    pub limit_high: Option<f64>,
    pub out_of_spec: bool,
}

impl ReportSnapshot {
    /// Freeze the subject's current state into a snapshot for `version`.
    ///
    /// Copies field values out of the models; nothing in the snapshot aliases
    /// the mutable subject rows.
    pub fn from_subject(
        sample: &sample::Model,
        tests: &[sample_test::Model],
        version: i32,
        generated_by: &str,
    ) -> Self {
        let lines = tests
            .iter()
            .map(|t| SnapshotLine {
                method: t.method.clone(),
                result_value: t.result_value,
                unit: t.unit.clone(),
                comparator: t.comparator.clone(),
                limit_low: t.limit_low,
                limit_high: t.limit_high,
                out_of_spec: t.out_of_spec,
            })
            .collect();

        Self {
            subject_id: sample.id,
            version,
            job_code: sample.job_code.clone(),
            sample_name: sample.name.clone(),
            matrix: sample.matrix.clone(),
            temperature: sample.temperature,
            condition: sample.condition.clone(),
            received_at: sample.received_at.clone(),
            generated_at: now_rfc3339(),
            generated_by: generated_by.to_string(),
            lines,
        }
    }
}

/// Result of a completed export
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub version_id: Uuid,
    pub version: i32,
    pub status: ReportStatus,
    pub document_key: String,
}

/// Result of a preview: render only, nothing persisted
#[derive(Debug, Clone)]
pub struct PreviewOutcome {
    pub version: i32,
    pub snapshot: ReportSnapshot,
    pub markup: String,
}
