//! sea-orm entities backing the dashboard store.

pub mod event_flag;
pub mod product_sales;
pub mod registered_product;
pub mod sales_data;
pub mod setting;
