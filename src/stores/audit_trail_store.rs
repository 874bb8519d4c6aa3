use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::diff::{diff_for_create, diff_for_delete, diff_for_update, ChangeSet, FieldMap};
use crate::errors::internal::AuditError;
use crate::errors::InternalError;
use crate::types::db::audit_entry::{self, Entity as AuditEntries};
use crate::types::internal::clock::now_rfc3339;
use crate::types::internal::{AuditAction, AuditContext, AuditGroup, AuditPage, AuditQuery, SubjectKind};

const DEFAULT_PAGE_SIZE: u64 = 25;
const MAX_PAGE_SIZE: u64 = 100;

/// Append-only ledger of record changes.
///
/// Owns the dedicated audit database connection. There is no update or
/// delete path: rows written here are permanent.
pub struct AuditTrailStore {
    db: DatabaseConnection,
}

impl AuditTrailStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Tag value tying together entries from one multi-record operation.
    /// Unique across concurrent calls.
    pub fn generate_transaction_tag() -> String {
        Uuid::new_v4().to_string()
    }

    /// Record the creation of a subject. All non-system fields appear in the
    /// entry with a null old side.
    pub async fn log_create(
        &self,
        ctx: &AuditContext,
        subject_type: SubjectKind,
        subject_id: &str,
        new_fields: &FieldMap,
        reason: Option<String>,
    ) -> Result<audit_entry::Model, InternalError> {
        let changes = diff_for_create(new_fields);
        self.append(ctx, AuditAction::Create, subject_type, subject_id, &changes, reason)
            .await
    }

    /// Record an update. Returns None without writing anything when the old
    /// and new field maps are equivalent.
    pub async fn log_update(
        &self,
        ctx: &AuditContext,
        subject_type: SubjectKind,
        subject_id: &str,
        old_fields: &FieldMap,
        new_fields: &FieldMap,
        reason: Option<String>,
    ) -> Result<Option<audit_entry::Model>, InternalError> {
        let changes = diff_for_update(old_fields, new_fields);
        if changes.is_empty() {
            tracing::debug!(
                "No-op update on {} {}: no audit entry written",
                subject_type,
                subject_id
            );
            return Ok(None);
        }
        let entry = self
            .append(ctx, AuditAction::Update, subject_type, subject_id, &changes, reason)
            .await?;
        Ok(Some(entry))
    }

    /// Record the deletion of a subject. All non-system fields appear in the
    /// entry with a null new side.
    pub async fn log_delete(
        &self,
        ctx: &AuditContext,
        subject_type: SubjectKind,
        subject_id: &str,
        old_fields: &FieldMap,
        reason: Option<String>,
    ) -> Result<audit_entry::Model, InternalError> {
        let changes = diff_for_delete(old_fields);
        self.append(ctx, AuditAction::Delete, subject_type, subject_id, &changes, reason)
            .await
    }

    async fn append(
        &self,
        ctx: &AuditContext,
        action: AuditAction,
        subject_type: SubjectKind,
        subject_id: &str,
        changes: &ChangeSet,
        reason: Option<String>,
    ) -> Result<audit_entry::Model, InternalError> {
        if !ctx.has_actor() {
            return Err(AuditError::ContextMissing.into());
        }

        let changes_json = serde_json::to_string(changes).map_err(AuditError::SerializationFailed)?;

        let entry = audit_entry::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            at: Set(now_rfc3339()),
            actor_id: Set(ctx.actor_id.clone()),
            actor_email: Set(ctx.actor_email.clone()),
            ip: Set(ctx.ip.clone()),
            user_agent: Set(ctx.user_agent.clone()),
            action: Set(action.as_str().to_string()),
            subject_type: Set(subject_type.as_str().to_string()),
            subject_id: Set(subject_id.to_string()),
            changes: Set(changes_json),
            reason: Set(reason),
            transaction_tag: Set(ctx.transaction_tag.clone()),
        };

        let inserted = entry
            .insert(&self.db)
            .await
            .map_err(|e| InternalError::database("append_audit_entry", e))?;

        Ok(inserted)
    }

    /// Filtered, paginated retrieval, newest first.
    pub async fn query(&self, filter: &AuditQuery) -> Result<AuditPage, InternalError> {
        let page = filter.page.max(1);
        let per_page = match filter.per_page {
            0 => DEFAULT_PAGE_SIZE,
            n => n.min(MAX_PAGE_SIZE),
        };

        let select = Self::apply_filters(AuditEntries::find(), filter)
            .order_by_desc(audit_entry::Column::At)
            .order_by_desc(audit_entry::Column::Id);

        let paginator = select.paginate(&self.db, per_page);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| InternalError::database("count_audit_entries", e))?;
        let entries = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| InternalError::database("query_audit_entries", e))?;

        Ok(AuditPage {
            entries,
            total,
            page,
            per_page,
        })
    }

    /// Same filtering as `query`, but entries sharing a transaction tag are
    /// merged into one group. Groups are newest-first by their newest member;
    /// untagged entries become singleton groups keyed by their own id.
    pub async fn query_grouped(&self, filter: &AuditQuery) -> Result<Vec<AuditGroup>, InternalError> {
        let entries = Self::apply_filters(AuditEntries::find(), filter)
            .order_by_desc(audit_entry::Column::At)
            .order_by_desc(audit_entry::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("query_grouped_audit_entries", e))?;

        // Entries arrive newest-first, so first-seen order of keys is already
        // the required group order (newest member first).
        let mut groups: Vec<AuditGroup> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for entry in entries {
            let key = match entry.transaction_tag.as_deref() {
                Some(tag) if !tag.is_empty() => tag.to_string(),
                _ => entry.id.to_string(),
            };

            match index.get(&key) {
                Some(&i) => groups[i].entries.push(entry),
                None => {
                    index.insert(key.clone(), groups.len());
                    groups.push(AuditGroup {
                        key,
                        at: entry.at.clone(),
                        actor_id: entry.actor_id.clone(),
                        actor_email: entry.actor_email.clone(),
                        ip: entry.ip.clone(),
                        user_agent: entry.user_agent.clone(),
                        entries: vec![entry],
                    });
                }
            }
        }

        Ok(groups)
    }

    /// Fetch a single entry by id.
    pub async fn get_by_id(&self, id: i64) -> Result<audit_entry::Model, InternalError> {
        AuditEntries::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("get_audit_entry", e))?
            .ok_or_else(|| AuditError::EntryNotFound(id).into())
    }

    fn apply_filters(
        mut select: sea_orm::Select<AuditEntries>,
        filter: &AuditQuery,
    ) -> sea_orm::Select<AuditEntries> {
        if let Some(subject_type) = filter.subject_type {
            select = select.filter(audit_entry::Column::SubjectType.eq(subject_type.as_str()));
        }
        if let Some(subject_id) = &filter.subject_id {
            select = select.filter(audit_entry::Column::SubjectId.eq(subject_id.clone()));
        }
        if let Some(actor_id) = &filter.actor_id {
            select = select.filter(audit_entry::Column::ActorId.eq(actor_id.clone()));
        }
        if let Some(action) = filter.action {
            select = select.filter(audit_entry::Column::Action.eq(action.as_str()));
        }
        if let Some(from) = filter.from {
            select = select.filter(audit_entry::Column::At.gte(format_bound(from)));
        }
        if let Some(to) = filter.to {
            select = select.filter(audit_entry::Column::At.lte(format_bound(to)));
        }
        if let Some(tag) = &filter.transaction_tag {
            select = select.filter(audit_entry::Column::TransactionTag.eq(tag.clone()));
        }
        select
    }
}

/// Bounds use the same fixed-width UTC format as stored timestamps so that
/// string comparison in SQL matches instant comparison.
fn format_bound(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Micros, true)
}
