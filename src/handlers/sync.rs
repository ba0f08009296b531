use crate::{
    context::RequestContext,
    errors::ApiError,
    models::{DateRange, Mall, MallSelection},
    services::sync::{DailySyncReport, NewProductSales, ProductSyncReport},
    ApiResponse, AppState,
};
use axum::{
    extract::{Path, State},
    response::Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({"startDate": "2024-01-01", "endDate": "2024-01-31"}))]
pub struct SyncProductRequest {
    #[schema(value_type = String, format = Date)]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = Date)]
    pub end_date: NaiveDate,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({"startDate": "2024-01-01", "endDate": "2024-01-31", "malls": ["amazon", "qoo10"]}))]
pub struct SyncDailySalesRequest {
    #[schema(value_type = String, format = Date)]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = Date)]
    pub end_date: NaiveDate,
    /// Malls to pull; every mall when omitted
    #[serde(default)]
    pub malls: Option<Vec<Mall>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SaveProductSalesRequest {
    pub rows: Vec<NewProductSales>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SaveProductSalesResponse {
    pub saved: usize,
}

fn with_failure_note<T>(failures: usize, report: T) -> ApiResponse<T> {
    let response = ApiResponse::success(report);
    if failures == 0 {
        response
    } else {
        response.with_message(format!("{} mall(s) failed to sync; see errors", failures))
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/sync/products/:id",
    params(
        ("id" = Uuid, Path, description = "Registration ID")
    ),
    request_body = SyncProductRequest,
    responses(
        (status = 200, description = "Per-mall sync report; failing malls are listed in errors", body = ApiResponse<ProductSyncReport>),
        (status = 400, description = "Invalid range", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "sync"
)]
pub async fn sync_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
    Json(payload): Json<SyncProductRequest>,
) -> Result<Json<ApiResponse<ProductSyncReport>>, ApiError> {
    let range = DateRange::new(payload.start_date, payload.end_date)?;
    info!(
        request_id = %ctx.request_id,
        operator = ctx.operator_label(),
        product_id = %id,
        "Product sync requested"
    );

    let report = state.services.sync.sync_product(id, range).await?;
    Ok(Json(with_failure_note(report.errors.len(), report)))
}

#[utoipa::path(
    post,
    path = "/api/v1/sync/daily-sales",
    request_body = SyncDailySalesRequest,
    responses(
        (status = 200, description = "Daily sales merged by date and stored", body = ApiResponse<DailySyncReport>),
        (status = 400, description = "Invalid range", body = crate::errors::ErrorResponse)
    ),
    tag = "sync"
)]
pub async fn sync_daily_sales(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(payload): Json<SyncDailySalesRequest>,
) -> Result<Json<ApiResponse<DailySyncReport>>, ApiError> {
    let range = DateRange::new(payload.start_date, payload.end_date)?;
    let malls = payload
        .malls
        .as_deref()
        .map(MallSelection::only)
        .unwrap_or_default();
    info!(
        request_id = %ctx.request_id,
        operator = ctx.operator_label(),
        malls = ?malls.selected(),
        "Daily sales sync requested"
    );

    let report = state.services.sync.sync_daily_sales(range, malls).await?;
    Ok(Json(with_failure_note(report.errors.len(), report)))
}

#[utoipa::path(
    post,
    path = "/api/v1/sync/save-product-sales",
    request_body = SaveProductSalesRequest,
    responses(
        (status = 200, description = "Rows inserted", body = ApiResponse<SaveProductSalesResponse>),
        (status = 400, description = "Invalid row", body = crate::errors::ErrorResponse)
    ),
    tag = "sync"
)]
pub async fn save_product_sales(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(payload): Json<SaveProductSalesRequest>,
) -> Result<Json<ApiResponse<SaveProductSalesResponse>>, ApiError> {
    let saved = state.services.sync.save_product_sales(payload.rows).await?;
    info!(
        request_id = %ctx.request_id,
        operator = ctx.operator_label(),
        saved,
        "Product sales rows saved"
    );
    Ok(Json(ApiResponse::success(SaveProductSalesResponse { saved })))
}
