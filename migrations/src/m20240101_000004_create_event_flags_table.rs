use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20240101_000004_create_event_flags_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EventFlags::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(EventFlags::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(EventFlags::Name).string_len(255).not_null())
                    .col(ColumnDef::new(EventFlags::Date).date().not_null())
                    .col(
                        ColumnDef::new(EventFlags::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(EventFlags::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EventFlags::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EventFlags::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum EventFlags {
    Table,
    Id,
    Name,
    Date,
    Description,
    CreatedAt,
    UpdatedAt,
}
