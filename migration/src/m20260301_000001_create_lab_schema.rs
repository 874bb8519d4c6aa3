use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Samples::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Samples::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Samples::JobCode).string().not_null())
                    .col(ColumnDef::new(Samples::Name).string().not_null())
                    .col(ColumnDef::new(Samples::Matrix).string().not_null())
                    .col(ColumnDef::new(Samples::Temperature).double())
                    .col(ColumnDef::new(Samples::Condition).string())
                    .col(ColumnDef::new(Samples::ReceivedAt).string())
                    .col(ColumnDef::new(Samples::CreatedAt).string().not_null())
                    .col(ColumnDef::new(Samples::UpdatedAt).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_samples_job_code")
                    .table(Samples::Table)
                    .col(Samples::JobCode)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SampleTests::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SampleTests::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(SampleTests::SampleId).uuid().not_null())
                    .col(ColumnDef::new(SampleTests::Method).string().not_null())
                    .col(ColumnDef::new(SampleTests::ResultValue).double())
                    .col(ColumnDef::new(SampleTests::Unit).string())
                    .col(ColumnDef::new(SampleTests::Comparator).string().not_null())
                    .col(ColumnDef::new(SampleTests::LimitLow).double())
                    .col(ColumnDef::new(SampleTests::LimitHigh).double())
                    .col(ColumnDef::new(SampleTests::OutOfSpec).boolean().not_null())
                    .col(ColumnDef::new(SampleTests::CreatedAt).string().not_null())
                    .col(ColumnDef::new(SampleTests::UpdatedAt).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sample_tests_sample_id")
                            .from(SampleTests::Table, SampleTests::SampleId)
                            .to(Samples::Table, Samples::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sample_tests_sample_id")
                    .table(SampleTests::Table)
                    .col(SampleTests::SampleId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SampleTests::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Samples::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Samples {
    Table,
    Id,
    JobCode,
    Name,
    Matrix,
    Temperature,
    Condition,
    ReceivedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum SampleTests {
    Table,
    Id,
    SampleId,
    Method,
    ResultValue,
    Unit,
    Comparator,
    LimitLow,
    LimitHigh,
    OutOfSpec,
    CreatedAt,
    UpdatedAt,
}
