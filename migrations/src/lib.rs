pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_sales_data_table;
mod m20240101_000002_create_registered_products_table;
mod m20240101_000003_create_product_sales_table;
mod m20240101_000004_create_event_flags_table;
mod m20240101_000005_create_settings_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_sales_data_table::Migration),
            Box::new(m20240101_000002_create_registered_products_table::Migration),
            Box::new(m20240101_000003_create_product_sales_table::Migration),
            Box::new(m20240101_000004_create_event_flags_table::Migration),
            Box::new(m20240101_000005_create_settings_table::Migration),
        ]
    }
}
