use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20240101_000001_create_sales_data_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Dates are intentionally not unique: repeated syncs may land the same day twice.
        manager
            .create_table(
                Table::create()
                    .table(SalesData::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SalesData::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(SalesData::Date).date().not_null())
                    .col(amount(SalesData::AmazonSales))
                    .col(amount(SalesData::RakutenSales))
                    .col(amount(SalesData::Qoo10Sales))
                    .col(amount(SalesData::AmazonAdCost))
                    .col(amount(SalesData::RakutenAdCost))
                    .col(amount(SalesData::Qoo10AdCost))
                    .col(amount(SalesData::XAdCost))
                    .col(amount(SalesData::TiktokAdCost))
                    .col(
                        ColumnDef::new(SalesData::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_sales_data_date")
                    .table(SalesData::Table)
                    .col(SalesData::Date)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SalesData::Table).to_owned())
            .await
    }
}

fn amount(column: SalesData) -> ColumnDef {
    ColumnDef::new(column)
        .decimal()
        .not_null()
        .default(0)
        .to_owned()
}

#[derive(DeriveIden, Clone, Copy)]
enum SalesData {
    Table,
    Id,
    Date,
    AmazonSales,
    RakutenSales,
    #[sea_orm(iden = "qoo10_sales")]
    Qoo10Sales,
    AmazonAdCost,
    RakutenAdCost,
    #[sea_orm(iden = "qoo10_ad_cost")]
    Qoo10AdCost,
    #[sea_orm(iden = "x_ad_cost")]
    XAdCost,
    TiktokAdCost,
    CreatedAt,
}
