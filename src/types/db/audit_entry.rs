use sea_orm::entity::prelude::*;

/// SeaORM entity for the audit_entries table
///
/// Rows are append-only. No code path mutates or deletes a row once written;
/// the entity intentionally has no update helpers.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "audit_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub at: String,
    pub actor_id: String,
    pub actor_email: String,
    pub ip: String,
    pub user_agent: String,
    pub action: String,
    pub subject_type: String,
    pub subject_id: String,
    pub changes: String,
    pub reason: Option<String>,
    pub transaction_tag: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
