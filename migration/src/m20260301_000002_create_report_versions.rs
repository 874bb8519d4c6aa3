use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ReportVersions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ReportVersions::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(ReportVersions::SubjectId).uuid().not_null())
                    .col(ColumnDef::new(ReportVersions::Version).integer().not_null())
                    .col(ColumnDef::new(ReportVersions::Status).string().not_null())
                    .col(ColumnDef::new(ReportVersions::DataSnapshot).text().not_null())
                    .col(ColumnDef::new(ReportVersions::RenderedSnapshot).text().not_null())
                    .col(ColumnDef::new(ReportVersions::DocumentKey).string())
                    .col(ColumnDef::new(ReportVersions::ReportedAt).string())
                    .col(ColumnDef::new(ReportVersions::CreatedById).string().not_null())
                    .col(ColumnDef::new(ReportVersions::ReportedById).string())
                    .col(ColumnDef::new(ReportVersions::ApprovedById).string())
                    .col(ColumnDef::new(ReportVersions::CreatedAt).string().not_null())
                    .col(ColumnDef::new(ReportVersions::UpdatedAt).string().not_null())
                    .to_owned(),
            )
            .await?;

        // One version number per subject; concurrent exports race on this index
        manager
            .create_index(
                Index::create()
                    .name("uq_report_versions_subject_version")
                    .table(ReportVersions::Table)
                    .col(ReportVersions::SubjectId)
                    .col(ReportVersions::Version)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // At most one FINAL row per subject, arbitrated by the database even
        // for writers that flip an existing row instead of inserting one
        manager
            .create_index(
                Index::create()
                    .name("uq_report_versions_single_final")
                    .table(ReportVersions::Table)
                    .col(ReportVersions::SubjectId)
                    .unique()
                    .and_where(Expr::col(ReportVersions::Status).eq("FINAL"))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_report_versions_subject_id")
                    .table(ReportVersions::Table)
                    .col(ReportVersions::SubjectId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_report_versions_status")
                    .table(ReportVersions::Table)
                    .col(ReportVersions::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ReportVersions::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum ReportVersions {
    Table,
    Id,
    SubjectId,
    Version,
    Status,
    DataSnapshot,
    RenderedSnapshot,
    DocumentKey,
    ReportedAt,
    CreatedById,
    ReportedById,
    ApprovedById,
    CreatedAt,
    UpdatedAt,
}
