use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20240101_000003_create_product_sales_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProductSales::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProductSales::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProductSales::Code).string_len(100).not_null())
                    .col(ColumnDef::new(ProductSales::Mall).string_len(16).not_null())
                    .col(ColumnDef::new(ProductSales::Date).date().not_null())
                    .col(
                        ColumnDef::new(ProductSales::Sales)
                            .decimal()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ProductSales::Quantity)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ProductSales::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Cached lookups always filter by (code, mall) and a date range.
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_product_sales_code_mall_date")
                    .table(ProductSales::Table)
                    .col(ProductSales::Code)
                    .col(ProductSales::Mall)
                    .col(ProductSales::Date)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProductSales::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ProductSales {
    Table,
    Id,
    Code,
    Mall,
    Date,
    Sales,
    Quantity,
    CreatedAt,
}
