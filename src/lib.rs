//! Mallboard API Library
//!
//! Sales dashboard backend: aggregates Amazon, Rakuten and Qoo10 sales with
//! X and TikTok ad spend into chart-ready series, and keeps the product, flag
//! and credential registries the dashboard needs.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod context;
pub mod db;
pub mod entities;
pub mod errors;
pub mod gateway;
pub mod handlers;
pub mod middleware_helpers;
pub mod models;
pub mod openapi;
pub mod services;
pub mod tracing;

use axum::{
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub services: handlers::AppServices,
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}


/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// Every route served under `/api/v1`.
pub fn api_v1_routes() -> Router<AppState> {
    let dashboard = Router::new()
        .route(
            "/dashboard/summary",
            get(handlers::dashboard::dashboard_summary),
        )
        .route(
            "/dashboard/product-sales",
            get(handlers::dashboard::product_sales),
        );

    let sales_data = Router::new().route(
        "/sales-data",
        get(handlers::sales_data::list_sales_data).post(handlers::sales_data::create_sales_data),
    );

    let products = Router::new()
        .route(
            "/products",
            get(handlers::products::list_products).post(handlers::products::create_product),
        )
        .route("/products/names", get(handlers::products::list_product_names))
        .route(
            "/products/:id",
            get(handlers::products::get_product)
                .put(handlers::products::update_product)
                .delete(handlers::products::delete_product),
        );

    let flags = Router::new()
        .route(
            "/flags",
            get(handlers::flags::list_flags).post(handlers::flags::create_flag),
        )
        .route(
            "/flags/:id",
            get(handlers::flags::get_flag)
                .put(handlers::flags::update_flag)
                .delete(handlers::flags::delete_flag),
        );

    let settings = Router::new().route(
        "/settings/mall-credentials",
        get(handlers::settings::get_mall_credentials).put(handlers::settings::save_mall_credentials),
    );

    let sync = Router::new()
        .route("/sync/products/:id", post(handlers::sync::sync_product))
        .route("/sync/daily-sales", post(handlers::sync::sync_daily_sales))
        .route(
            "/sync/save-product-sales",
            post(handlers::sync::save_product_sales),
        );

    let tiktok = Router::new()
        .route(
            "/tiktok/accounts/register",
            post(handlers::tiktok::register_account),
        )
        .route(
            "/tiktok/accounts/bulk-register",
            post(handlers::tiktok::bulk_register_accounts),
        )
        .route(
            "/tiktok/accounts/:id",
            get(handlers::tiktok::list_accounts).delete(handlers::tiktok::delete_account),
        )
        .route("/tiktok/analytics/:id", get(handlers::tiktok::analytics));

    Router::new()
        .route("/status", get(handlers::health::status))
        .route("/health", get(handlers::health::health))
        .merge(dashboard)
        .merge(sales_data)
        .merge(products)
        .merge(flags)
        .merge(settings)
        .merge(sync)
        .merge(tiktok)
}
