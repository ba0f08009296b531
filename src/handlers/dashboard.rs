use crate::{
    errors::ServiceError,
    handlers::common::parse_uuid_list,
    models::{AdChannelSelection, DateRange, MallSelection},
    services::aggregation::{build_dashboard, DashboardSummary},
    services::product_sales::{ProductSalesQuery, ProductSalesSummary, ProductTarget},
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Query, State},
    response::Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;
use utoipa::IntoParams;
use uuid::Uuid;

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DashboardQuery {
    /// First day, inclusive
    #[param(value_type = String, format = Date, example = "2024-01-01")]
    pub start_date: NaiveDate,
    /// Last day, inclusive
    #[param(value_type = String, format = Date, example = "2024-01-31")]
    pub end_date: NaiveDate,
    /// Comma-separated malls counted in total sales; omitted means all, empty means none
    #[param(example = "amazon,rakuten")]
    pub malls: Option<String>,
    /// Comma-separated ad channels counted in total ad cost
    #[param(example = "amazon,x,tiktok")]
    pub ad_channels: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProductSalesParams {
    #[param(value_type = String, format = Date)]
    pub start_date: NaiveDate,
    #[param(value_type = String, format = Date)]
    pub end_date: NaiveDate,
    /// Roll up every registration sharing this product name
    pub product_name: Option<String>,
    /// Roll up a single registration
    pub product_id: Option<Uuid>,
    /// Comma-separated registration ids
    pub product_ids: Option<String>,
}

impl ProductSalesParams {
    /// Exactly one of productName, productId or productIds must be given.
    pub fn target(&self) -> Result<ProductTarget, ServiceError> {
        let name = self
            .product_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty());

        match (name, self.product_id, self.product_ids.as_deref()) {
            (Some(name), None, None) => Ok(ProductTarget::Family(name.to_string())),
            (None, Some(id), None) => Ok(ProductTarget::Single(id)),
            (None, None, Some(ids)) => Ok(ProductTarget::Subset(parse_uuid_list(ids)?)),
            _ => Err(ServiceError::ValidationError(
                "Provide exactly one of productName, productId or productIds".to_string(),
            )),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/summary",
    params(DashboardQuery),
    responses(
        (status = 200, description = "Chart series and KPI totals", body = ApiResponse<DashboardSummary>),
        (status = 400, description = "Invalid range or selection", body = crate::errors::ErrorResponse)
    ),
    tag = "dashboard"
)]
pub async fn dashboard_summary(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> ApiResult<DashboardSummary> {
    let range = DateRange::new(query.start_date, query.end_date)?;
    let malls = MallSelection::parse(query.malls.as_deref())?;
    let channels = AdChannelSelection::parse(query.ad_channels.as_deref())?;

    let records = state.services.sales_data.list(range).await?;
    let flags = state.services.flags.list(Some(range)).await?;
    debug!(
        records = records.len(),
        flags = flags.len(),
        "Building dashboard summary"
    );

    Ok(Json(ApiResponse::success(build_dashboard(
        &records, &flags, range, &malls, &channels,
    ))))
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/product-sales",
    params(ProductSalesParams),
    responses(
        (status = 200, description = "Per-date sales summed across every marketplace code", body = ApiResponse<ProductSalesSummary>),
        (status = 400, description = "Invalid range or product selection", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown product", body = crate::errors::ErrorResponse)
    ),
    tag = "dashboard"
)]
pub async fn product_sales(
    State(state): State<AppState>,
    Query(params): Query<ProductSalesParams>,
) -> ApiResult<ProductSalesSummary> {
    let range = DateRange::new(params.start_date, params.end_date)?;
    let target = params.target()?;

    let summary = state
        .services
        .product_sales
        .aggregate(ProductSalesQuery { target, range })
        .await?;
    Ok(Json(ApiResponse::success(summary)))
}
