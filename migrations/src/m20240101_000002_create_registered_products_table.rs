use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20240101_000002_create_registered_products_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RegisteredProducts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RegisteredProducts::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RegisteredProducts::ProductName)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RegisteredProducts::SkuName)
                            .string_len(255)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(RegisteredProducts::AmazonCode)
                            .string_len(100)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(RegisteredProducts::RakutenCode)
                            .string_len(100)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(RegisteredProducts::Qoo10Code)
                            .string_len(100)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(RegisteredProducts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RegisteredProducts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_registered_products_product_name")
                    .table(RegisteredProducts::Table)
                    .col(RegisteredProducts::ProductName)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RegisteredProducts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum RegisteredProducts {
    Table,
    Id,
    ProductName,
    SkuName,
    AmazonCode,
    RakutenCode,
    #[sea_orm(iden = "qoo10_code")]
    Qoo10Code,
    CreatedAt,
    UpdatedAt,
}
