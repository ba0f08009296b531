//! Pass-through to the remote TikTok account endpoints. Bodies are forwarded untouched.

use crate::{context::RequestContext, models::DateRange, ApiResponse, ApiResult, AppState};
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AnalyticsQuery {
    #[param(value_type = String, format = Date)]
    pub start_date: NaiveDate,
    #[param(value_type = String, format = Date)]
    pub end_date: NaiveDate,
}

#[utoipa::path(
    get,
    path = "/api/v1/tiktok/accounts/:id",
    params(
        ("id" = String, Path, description = "Product ID the accounts are linked to")
    ),
    responses(
        (status = 200, description = "Remote account list", body = ApiResponse<serde_json::Value>),
        (status = 502, description = "Remote API failed", body = crate::errors::ErrorResponse)
    ),
    tag = "tiktok"
)]
pub async fn list_accounts(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> ApiResult<Value> {
    let accounts = state.services.gateway.tiktok_accounts(&product_id).await?;
    Ok(Json(ApiResponse::success(accounts)))
}

#[utoipa::path(
    post,
    path = "/api/v1/tiktok/accounts/register",
    request_body = serde_json::Value,
    responses(
        (status = 200, description = "Remote registration result", body = ApiResponse<serde_json::Value>),
        (status = 502, description = "Remote API failed", body = crate::errors::ErrorResponse)
    ),
    tag = "tiktok"
)]
pub async fn register_account(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(payload): Json<Value>,
) -> ApiResult<Value> {
    info!(request_id = %ctx.request_id, operator = ctx.operator_label(), "Registering TikTok account");
    let result = state.services.gateway.register_tiktok_account(payload).await?;
    Ok(Json(ApiResponse::success(result)))
}

#[utoipa::path(
    post,
    path = "/api/v1/tiktok/accounts/bulk-register",
    request_body = serde_json::Value,
    responses(
        (status = 200, description = "Remote bulk registration result", body = ApiResponse<serde_json::Value>),
        (status = 502, description = "Remote API failed", body = crate::errors::ErrorResponse)
    ),
    tag = "tiktok"
)]
pub async fn bulk_register_accounts(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(payload): Json<Value>,
) -> ApiResult<Value> {
    info!(request_id = %ctx.request_id, operator = ctx.operator_label(), "Bulk registering TikTok accounts");
    let result = state
        .services
        .gateway
        .bulk_register_tiktok_accounts(payload)
        .await?;
    Ok(Json(ApiResponse::success(result)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/tiktok/accounts/:id",
    params(
        ("id" = String, Path, description = "Remote account ID")
    ),
    responses(
        (status = 200, description = "Remote deletion result", body = ApiResponse<serde_json::Value>),
        (status = 502, description = "Remote API failed", body = crate::errors::ErrorResponse)
    ),
    tag = "tiktok"
)]
pub async fn delete_account(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
    ctx: RequestContext,
) -> ApiResult<Value> {
    info!(
        request_id = %ctx.request_id,
        operator = ctx.operator_label(),
        account_id = %account_id,
        "Deleting TikTok account"
    );
    let result = state
        .services
        .gateway
        .delete_tiktok_account(&account_id)
        .await?;
    Ok(Json(ApiResponse::success(result)))
}

#[utoipa::path(
    get,
    path = "/api/v1/tiktok/analytics/:id",
    params(
        ("id" = String, Path, description = "Product ID"),
        AnalyticsQuery
    ),
    responses(
        (status = 200, description = "Remote analytics payload", body = ApiResponse<serde_json::Value>),
        (status = 400, description = "Invalid range", body = crate::errors::ErrorResponse),
        (status = 502, description = "Remote API failed", body = crate::errors::ErrorResponse)
    ),
    tag = "tiktok"
)]
pub async fn analytics(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    Query(query): Query<AnalyticsQuery>,
) -> ApiResult<Value> {
    let range = DateRange::new(query.start_date, query.end_date)?;
    let payload = state
        .services
        .gateway
        .tiktok_analytics(&product_id, range)
        .await?;
    Ok(Json(ApiResponse::success(payload)))
}
