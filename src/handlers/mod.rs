pub mod common;
pub mod dashboard;
pub mod flags;
pub mod health;
pub mod products;
pub mod sales_data;
pub mod settings;
pub mod sync;
pub mod tiktok;

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::gateway::MarketplaceGateway;
use crate::services::{
    credentials::CredentialService, flags::FlagService, product_sales::ProductSalesService,
    products::ProductService, sales_data::SalesDataService, sync::SyncService,
};

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub sales_data: Arc<SalesDataService>,
    pub products: Arc<ProductService>,
    pub flags: Arc<FlagService>,
    pub credentials: Arc<CredentialService>,
    pub product_sales: Arc<ProductSalesService>,
    pub sync: Arc<SyncService>,
    pub gateway: Arc<dyn MarketplaceGateway>,
}

impl AppServices {
    pub fn new(db: Arc<DatabaseConnection>, gateway: Arc<dyn MarketplaceGateway>) -> Self {
        Self {
            sales_data: Arc::new(SalesDataService::new(db.clone())),
            products: Arc::new(ProductService::new(db.clone())),
            flags: Arc::new(FlagService::new(db.clone())),
            credentials: Arc::new(CredentialService::new(db.clone())),
            product_sales: Arc::new(ProductSalesService::new(db.clone(), gateway.clone())),
            sync: Arc::new(SyncService::new(db, gateway.clone())),
            gateway,
        }
    }
}
