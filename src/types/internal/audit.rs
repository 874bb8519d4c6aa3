use std::fmt;

use chrono::{DateTime, Utc};

use crate::types::db::audit_entry;

/// Action recorded by an audit entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    Create,
    Update,
    Delete,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CREATE" => Some(Self::Create),
            "UPDATE" => Some(Self::Update),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Closed set of record kinds the audit trail knows about.
///
/// Free-form subject strings would let a typo silently split one entity's
/// history in two; a new kind is an explicit variant instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectKind {
    Job,
    Sample,
    SampleTest,
    ReportVersion,
}

impl SubjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Job => "Job",
            Self::Sample => "Sample",
            Self::SampleTest => "SampleTest",
            Self::ReportVersion => "ReportVersion",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Job" => Some(Self::Job),
            "Sample" => Some(Self::Sample),
            "SampleTest" => Some(Self::SampleTest),
            "ReportVersion" => Some(Self::ReportVersion),
            _ => None,
        }
    }
}

impl fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Filter set for audit queries. Every field is independently optional;
/// present fields combine with AND.
#[derive(Debug, Clone, Default)]
pub struct AuditQuery {
    pub subject_type: Option<SubjectKind>,
    pub subject_id: Option<String>,
    pub actor_id: Option<String>,
    pub action: Option<AuditAction>,
    /// Inclusive lower bound
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound
    pub to: Option<DateTime<Utc>>,
    pub transaction_tag: Option<String>,
    /// 1-based page number; 0 is treated as 1
    pub page: u64,
    pub per_page: u64,
}

/// One page of audit entries, newest first, with the unpaginated total.
#[derive(Debug)]
pub struct AuditPage {
    pub entries: Vec<audit_entry::Model>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Entries that share a transaction tag, merged into one logical operation.
///
/// Untagged entries become singleton groups keyed by their own id.
#[derive(Debug)]
pub struct AuditGroup {
    pub key: String,
    /// Timestamp of the newest member
    pub at: String,
    pub actor_id: String,
    pub actor_email: String,
    pub ip: String,
    pub user_agent: String,
    pub entries: Vec<audit_entry::Model>,
}
