// Dashboard aggregation
pub mod aggregation;
pub mod product_sales;

// Registries and stores
pub mod credentials;
pub mod flags;
pub mod products;
pub mod sales_data;

// Remote marketplace sync
pub mod sync;
