use crate::{
    context::RequestContext,
    entities::event_flag,
    errors::ServiceError,
    handlers::common::{
        created_response, no_content_response, optional_range, validate_input, CreatedResult,
    },
    services::flags::FlagInput,
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;
use utoipa::IntoParams;
use uuid::Uuid;

#[derive(Debug, Deserialize, Default, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct FlagListQuery {
    #[param(value_type = Option<String>, format = Date)]
    pub start_date: Option<NaiveDate>,
    #[param(value_type = Option<String>, format = Date)]
    pub end_date: Option<NaiveDate>,
}

#[utoipa::path(
    get,
    path = "/api/v1/flags",
    params(FlagListQuery),
    responses(
        (status = 200, description = "Flags, newest date first", body = ApiResponse<Vec<event_flag::Model>>),
        (status = 400, description = "Invalid range", body = crate::errors::ErrorResponse)
    ),
    tag = "flags"
)]
pub async fn list_flags(
    State(state): State<AppState>,
    Query(query): Query<FlagListQuery>,
) -> ApiResult<Vec<event_flag::Model>> {
    let range = optional_range(query.start_date, query.end_date)?;
    let flags = state.services.flags.list(range).await?;
    Ok(Json(ApiResponse::success(flags)))
}

#[utoipa::path(
    get,
    path = "/api/v1/flags/:id",
    params(
        ("id" = Uuid, Path, description = "Flag ID")
    ),
    responses(
        (status = 200, description = "Flag fetched", body = ApiResponse<event_flag::Model>),
        (status = 404, description = "Flag not found", body = crate::errors::ErrorResponse)
    ),
    tag = "flags"
)]
pub async fn get_flag(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<event_flag::Model> {
    let flag = state.services.flags.get(id).await?;
    Ok(Json(ApiResponse::success(flag)))
}

#[utoipa::path(
    post,
    path = "/api/v1/flags",
    request_body = FlagInput,
    responses(
        (status = 201, description = "Flag created", body = ApiResponse<event_flag::Model>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "flags"
)]
pub async fn create_flag(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(payload): Json<FlagInput>,
) -> CreatedResult<event_flag::Model> {
    validate_input(&payload)?;

    let flag = state.services.flags.create(payload).await?;
    info!(
        request_id = %ctx.request_id,
        operator = ctx.operator_label(),
        flag_id = %flag.id,
        "Event flag created"
    );
    Ok(created_response(flag))
}

#[utoipa::path(
    put,
    path = "/api/v1/flags/:id",
    params(
        ("id" = Uuid, Path, description = "Flag ID")
    ),
    request_body = FlagInput,
    responses(
        (status = 200, description = "Flag updated", body = ApiResponse<event_flag::Model>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Flag not found", body = crate::errors::ErrorResponse)
    ),
    tag = "flags"
)]
pub async fn update_flag(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
    Json(payload): Json<FlagInput>,
) -> ApiResult<event_flag::Model> {
    let flag = state.services.flags.update(id, payload).await?;
    info!(
        request_id = %ctx.request_id,
        operator = ctx.operator_label(),
        flag_id = %id,
        "Event flag updated"
    );
    Ok(Json(ApiResponse::success(flag)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/flags/:id",
    params(
        ("id" = Uuid, Path, description = "Flag ID")
    ),
    responses(
        (status = 204, description = "Flag deleted"),
        (status = 404, description = "Flag not found", body = crate::errors::ErrorResponse)
    ),
    tag = "flags"
)]
pub async fn delete_flag(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> Result<StatusCode, ServiceError> {
    state.services.flags.delete(id).await?;
    info!(
        request_id = %ctx.request_id,
        operator = ctx.operator_label(),
        flag_id = %id,
        "Event flag deleted"
    );
    Ok(no_content_response())
}
