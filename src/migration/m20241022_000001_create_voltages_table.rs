use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Voltages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Voltages::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Voltages::Message).string().not_null())
                    .col(ColumnDef::new(Voltages::Volt).double().not_null())
                    .col(
                        ColumnDef::new(Voltages::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Voltages::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Voltages {
    Table,
    Id,
    Message,
    Volt,
    CreatedAt,
}
