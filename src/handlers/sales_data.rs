use crate::{
    context::RequestContext,
    entities::sales_data,
    handlers::common::{created_response, CreatedResult},
    models::DateRange,
    services::sales_data::NewDailySales,
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Query, State},
    response::Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SalesDataQuery {
    #[param(value_type = String, format = Date, example = "2024-01-01")]
    pub start_date: NaiveDate,
    #[param(value_type = String, format = Date, example = "2024-01-31")]
    pub end_date: NaiveDate,
}

#[utoipa::path(
    get,
    path = "/api/v1/sales-data",
    params(SalesDataQuery),
    responses(
        (status = 200, description = "Stored daily rows in range, date ascending", body = ApiResponse<Vec<sales_data::Model>>),
        (status = 400, description = "Invalid range", body = crate::errors::ErrorResponse)
    ),
    tag = "sales-data"
)]
pub async fn list_sales_data(
    State(state): State<AppState>,
    Query(query): Query<SalesDataQuery>,
) -> ApiResult<Vec<sales_data::Model>> {
    let range = DateRange::new(query.start_date, query.end_date)?;
    let rows = state.services.sales_data.list(range).await?;
    Ok(Json(ApiResponse::success(rows)))
}

#[utoipa::path(
    post,
    path = "/api/v1/sales-data",
    request_body = NewDailySales,
    responses(
        (status = 201, description = "Row stored", body = ApiResponse<sales_data::Model>),
        (status = 400, description = "Negative amount", body = crate::errors::ErrorResponse)
    ),
    tag = "sales-data"
)]
pub async fn create_sales_data(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(payload): Json<NewDailySales>,
) -> CreatedResult<sales_data::Model> {
    let row = state.services.sales_data.create(payload).await?;
    info!(
        request_id = %ctx.request_id,
        operator = ctx.operator_label(),
        date = %row.date,
        "Daily sales row added"
    );
    Ok(created_response(row))
}
