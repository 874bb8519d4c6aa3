use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create audit_entries table. Append-only: no update/delete path exists
        // in the application and none should be added here.
        manager
            .create_table(
                Table::create()
                    .table(AuditEntries::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AuditEntries::Id).big_integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(AuditEntries::At).string().not_null())
                    .col(ColumnDef::new(AuditEntries::ActorId).string().not_null())
                    .col(ColumnDef::new(AuditEntries::ActorEmail).string().not_null())
                    .col(ColumnDef::new(AuditEntries::Ip).string().not_null())
                    .col(ColumnDef::new(AuditEntries::UserAgent).string().not_null())
                    .col(ColumnDef::new(AuditEntries::Action).string().not_null())
                    .col(ColumnDef::new(AuditEntries::SubjectType).string().not_null())
                    .col(ColumnDef::new(AuditEntries::SubjectId).string().not_null())
                    .col(ColumnDef::new(AuditEntries::Changes).text().not_null())
                    .col(ColumnDef::new(AuditEntries::Reason).string())
                    .col(ColumnDef::new(AuditEntries::TransactionTag).string())
                    .to_owned(),
            )
            .await?;

        // Create indexes separately
        manager
            .create_index(
                Index::create()
                    .name("idx_audit_entries_subject")
                    .table(AuditEntries::Table)
                    .col(AuditEntries::SubjectType)
                    .col(AuditEntries::SubjectId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_audit_entries_actor_id")
                    .table(AuditEntries::Table)
                    .col(AuditEntries::ActorId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_audit_entries_at")
                    .table(AuditEntries::Table)
                    .col(AuditEntries::At)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_audit_entries_transaction_tag")
                    .table(AuditEntries::Table)
                    .col(AuditEntries::TransactionTag)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AuditEntries::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum AuditEntries {
    Table,
    At,
    Id,
    ActorId,
    ActorEmail,
    Ip,
    UserAgent,
    Action,
    SubjectType,
    SubjectId,
    Changes,
    Reason,
    TransactionTag,
}
