use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Telemetry::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Telemetry::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Telemetry::Message).string().not_null())
                    .col(ColumnDef::new(Telemetry::BinaryData).text().null())
                    .col(ColumnDef::new(Telemetry::PlotPath).string().null())
                    .col(ColumnDef::new(Telemetry::GoertzelPlotPath).string().null())
                    .col(
                        ColumnDef::new(Telemetry::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_telemetry_created_at")
                    .table(Telemetry::Table)
                    .col(Telemetry::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Telemetry::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Telemetry {
    Table,
    Id,
    Message,
    BinaryData,
    PlotPath,
    GoertzelPlotPath,
    CreatedAt,
}
