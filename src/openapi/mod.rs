use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Mallboard API",
        version = "0.1.0",
        description = r#"
# Mallboard Sales Dashboard API

Aggregates daily sales from Amazon, Rakuten and Qoo10 together with advertising
spend on those malls and on X and TikTok.

## Features

- **Dashboard**: date-sorted chart series with per-mall and per-channel toggles, KPI totals and ROAS
- **Product sales**: per-SKU sales rolled up across every marketplace code of a product
- **Sync**: pulls sales from the remote aggregation API and stores them
- **Registries**: products and their marketplace codes, event flags on the timeline, mall credentials

## Conventions

Dates are `YYYY-MM-DD` and ranges are inclusive on both ends. Money amounts are
decimal strings. Every response carries `meta.requestId`, echoed in the
`x-request-id` header.

## Error Handling

```json
{
  "error": "Bad Request",
  "message": "Validation error: startDate 2024-02-01 is after endDate 2024-01-01",
  "requestId": "6f1c...",
  "timestamp": "2024-01-01T00:00:00Z"
}
```
        "#
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "dashboard", description = "Chart series and KPI endpoints"),
        (name = "sales-data", description = "Stored mall-wide daily sales"),
        (name = "products", description = "Product and SKU registry"),
        (name = "flags", description = "Event flags plotted on the timeline"),
        (name = "settings", description = "Marketplace credentials"),
        (name = "sync", description = "Remote marketplace sync"),
        (name = "tiktok", description = "TikTok account pass-through"),
        (name = "health", description = "Health check endpoints")
    ),
    paths(
        // Health
        crate::handlers::health::status,
        crate::handlers::health::health,

        // Dashboard
        crate::handlers::dashboard::dashboard_summary,
        crate::handlers::dashboard::product_sales,

        // Sales data
        crate::handlers::sales_data::list_sales_data,
        crate::handlers::sales_data::create_sales_data,

        // Products
        crate::handlers::products::list_products,
        crate::handlers::products::list_product_names,
        crate::handlers::products::get_product,
        crate::handlers::products::create_product,
        crate::handlers::products::update_product,
        crate::handlers::products::delete_product,

        // Flags
        crate::handlers::flags::list_flags,
        crate::handlers::flags::get_flag,
        crate::handlers::flags::create_flag,
        crate::handlers::flags::update_flag,
        crate::handlers::flags::delete_flag,

        // Settings
        crate::handlers::settings::get_mall_credentials,
        crate::handlers::settings::save_mall_credentials,

        // Sync
        crate::handlers::sync::sync_product,
        crate::handlers::sync::sync_daily_sales,
        crate::handlers::sync::save_product_sales,

        // TikTok
        crate::handlers::tiktok::list_accounts,
        crate::handlers::tiktok::register_account,
        crate::handlers::tiktok::bulk_register_accounts,
        crate::handlers::tiktok::delete_account,
        crate::handlers::tiktok::analytics,
    ),
    components(
        schemas(
            // Common types
            crate::ApiResponse<serde_json::Value>,
            crate::ResponseMeta,
            crate::models::Mall,
            crate::models::AdChannel,
            crate::models::DateRange,

            // Dashboard
            crate::services::aggregation::ChartPoint,
            crate::services::aggregation::DashboardSummary,
            crate::services::aggregation::DashboardTotals,
            crate::services::aggregation::MallSalesTotals,
            crate::services::product_sales::ProductSalesSummary,
            crate::services::product_sales::ProductSalesPoint,
            crate::services::product_sales::FailedMall,

            // Stored entities
            crate::entities::sales_data::Model,
            crate::entities::registered_product::Model,
            crate::entities::event_flag::Model,

            // Requests
            crate::services::sales_data::NewDailySales,
            crate::services::products::ProductInput,
            crate::services::flags::FlagInput,
            crate::services::credentials::MallCredentials,
            crate::services::credentials::MarketplaceLogin,
            crate::services::credentials::AdPlatformKey,
            crate::services::sync::NewProductSales,
            crate::handlers::sync::SyncProductRequest,
            crate::handlers::sync::SyncDailySalesRequest,
            crate::handlers::sync::SaveProductSalesRequest,

            // Sync reports
            crate::services::sync::ProductSyncReport,
            crate::services::sync::DailySyncReport,
            crate::services::sync::MallSyncCount,
            crate::services::sync::SyncFailure,
            crate::handlers::sync::SaveProductSalesResponse,

            // Health
            crate::handlers::health::StatusResponse,
            crate::handlers::health::HealthResponse,
            crate::handlers::health::ComponentStatus,

            // Error types
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_dashboard_and_sync_paths() {
        let openapi = ApiDocV1::openapi();
        let json = serde_json::to_string_pretty(&openapi).unwrap();
        assert!(json.contains("Mallboard API"));
        assert!(json.contains("/api/v1/dashboard/summary"));
        assert!(json.contains("/api/v1/sync/save-product-sales"));
        assert!(json.contains("DailySalesRecord"));
    }

    #[test]
    fn request_and_error_schemas_carry_examples() {
        let json = serde_json::to_string(&ApiDocV1::openapi()).unwrap();
        assert!(json.contains("550e8400-e29b-41d4-a716-446655440000"));
        assert!(json.contains("2024-12-09T10:30:00.000Z"));
        assert!(json.contains("2024-01-31"));
    }
}
