use crate::{
    context::RequestContext, services::credentials::MallCredentials, ApiResponse, ApiResult,
    AppState,
};
use axum::{extract::State, response::Json};
use tracing::info;

#[utoipa::path(
    get,
    path = "/api/v1/settings/mall-credentials",
    responses(
        (status = 200, description = "Saved credentials, or an empty document", body = ApiResponse<MallCredentials>),
        (status = 500, description = "Stored document is corrupt", body = crate::errors::ErrorResponse)
    ),
    tag = "settings"
)]
pub async fn get_mall_credentials(State(state): State<AppState>) -> ApiResult<MallCredentials> {
    let credentials = state.services.credentials.get().await?;
    Ok(Json(ApiResponse::success(credentials)))
}

#[utoipa::path(
    put,
    path = "/api/v1/settings/mall-credentials",
    request_body = MallCredentials,
    responses(
        (status = 200, description = "Credentials replaced", body = ApiResponse<MallCredentials>)
    ),
    tag = "settings"
)]
pub async fn save_mall_credentials(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(payload): Json<MallCredentials>,
) -> ApiResult<MallCredentials> {
    let saved = state.services.credentials.save(payload).await?;
    info!(
        request_id = %ctx.request_id,
        operator = ctx.operator_label(),
        "Mall credentials replaced"
    );
    Ok(Json(ApiResponse::success(saved)))
}
