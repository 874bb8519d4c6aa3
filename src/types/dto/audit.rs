use poem_openapi::Object;

use crate::types::db::audit_entry;
use crate::types::internal::{AuditGroup, AuditPage};

/// One audit ledger entry
#[derive(Object, Debug)]
pub struct AuditEntryDto {
    pub id: i64,
    pub at: String,
    pub actor_id: String,
    pub actor_email: String,
    pub ip: String,
    pub user_agent: String,
    pub action: String,
    pub subject_type: String,
    pub subject_id: String,
    /// JSON map of field name to {old, new}
    pub changes: String,
    pub reason: Option<String>,
    pub transaction_tag: Option<String>,
}

impl From<audit_entry::Model> for AuditEntryDto {
    fn from(m: audit_entry::Model) -> Self {
        Self {
            id: m.id,
            at: m.at,
            actor_id: m.actor_id,
            actor_email: m.actor_email,
            ip: m.ip,
            user_agent: m.user_agent,
            action: m.action,
            subject_type: m.subject_type,
            subject_id: m.subject_id,
            changes: m.changes,
            reason: m.reason,
            transaction_tag: m.transaction_tag,
        }
    }
}

/// Paginated audit entries, newest first
#[derive(Object, Debug)]
pub struct AuditPageResponse {
    pub entries: Vec<AuditEntryDto>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

impl From<AuditPage> for AuditPageResponse {
    fn from(page: AuditPage) -> Self {
        Self {
            entries: page.entries.into_iter().map(Into::into).collect(),
            total: page.total,
            page: page.page,
            per_page: page.per_page,
        }
    }
}

/// Entries merged by transaction tag
#[derive(Object, Debug)]
pub struct AuditGroupDto {
    pub key: String,
    pub at: String,
    pub actor_id: String,
    pub actor_email: String,
    pub ip: String,
    pub user_agent: String,
    pub entries: Vec<AuditEntryDto>,
}

impl From<AuditGroup> for AuditGroupDto {
    fn from(g: AuditGroup) -> Self {
        Self {
            key: g.key,
            at: g.at,
            actor_id: g.actor_id,
            actor_email: g.actor_email,
            ip: g.ip,
            user_agent: g.user_agent,
            entries: g.entries.into_iter().map(Into::into).collect(),
        }
    }
}

/// Grouped audit view
#[derive(Object, Debug)]
pub struct AuditGroupsResponse {
    pub groups: Vec<AuditGroupDto>,
}
