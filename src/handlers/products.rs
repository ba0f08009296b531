use crate::{
    context::RequestContext,
    entities::registered_product,
    errors::ServiceError,
    handlers::common::{created_response, no_content_response, validate_input, CreatedResult},
    services::products::ProductInput,
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use tracing::info;
use utoipa::IntoParams;
use uuid::Uuid;

#[derive(Debug, Deserialize, Default, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProductListQuery {
    /// Only registrations of this product family
    pub product_name: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/products",
    params(ProductListQuery),
    responses(
        (status = 200, description = "Product registrations", body = ApiResponse<Vec<registered_product::Model>>)
    ),
    tag = "products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> ApiResult<Vec<registered_product::Model>> {
    let products = state
        .services
        .products
        .list(query.product_name.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(products)))
}

#[utoipa::path(
    get,
    path = "/api/v1/products/names",
    responses(
        (status = 200, description = "Distinct product family names", body = ApiResponse<Vec<String>>)
    ),
    tag = "products"
)]
pub async fn list_product_names(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    let names = state.services.products.product_names().await?;
    Ok(Json(ApiResponse::success(names)))
}

#[utoipa::path(
    get,
    path = "/api/v1/products/:id",
    params(
        ("id" = Uuid, Path, description = "Registration ID")
    ),
    responses(
        (status = 200, description = "Product registration", body = ApiResponse<registered_product::Model>),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<registered_product::Model> {
    let product = state.services.products.get(id).await?;
    Ok(Json(ApiResponse::success(product)))
}

#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = ProductInput,
    responses(
        (status = 201, description = "Product registered", body = ApiResponse<registered_product::Model>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(payload): Json<ProductInput>,
) -> CreatedResult<registered_product::Model> {
    validate_input(&payload)?;

    let product = state.services.products.create(payload).await?;
    info!(
        request_id = %ctx.request_id,
        operator = ctx.operator_label(),
        product_id = %product.id,
        "Product registration created"
    );
    Ok(created_response(product))
}

#[utoipa::path(
    put,
    path = "/api/v1/products/:id",
    params(
        ("id" = Uuid, Path, description = "Registration ID")
    ),
    request_body = ProductInput,
    responses(
        (status = 200, description = "Product updated", body = ApiResponse<registered_product::Model>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
    Json(payload): Json<ProductInput>,
) -> ApiResult<registered_product::Model> {
    let product = state.services.products.update(id, payload).await?;
    info!(
        request_id = %ctx.request_id,
        operator = ctx.operator_label(),
        product_id = %id,
        "Product registration updated"
    );
    Ok(Json(ApiResponse::success(product)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/products/:id",
    params(
        ("id" = Uuid, Path, description = "Registration ID")
    ),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> Result<StatusCode, ServiceError> {
    state.services.products.delete(id).await?;
    info!(
        request_id = %ctx.request_id,
        operator = ctx.operator_label(),
        product_id = %id,
        "Product registration deleted"
    );
    Ok(no_content_response())
}
