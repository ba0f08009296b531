use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use utoipa::ToSchema;

use crate::handlers::AppState;

/// Component health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Up,
    Down,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub status: ComponentStatus,
    pub service: String,
    pub version: String,
    pub environment: String,
    pub uptime_secs: u64,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: ComponentStatus,
    pub database: ComponentStatus,
    pub database_latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Remote aggregation API base URL; not contacted by the health check
    pub gateway_base_url: String,
    pub timestamp: String,
}

/// Tracks application start time for uptime calculation
static START_TIME: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

/// Initialize the start time (call this on application startup)
pub fn init_start_time() {
    let _ = START_TIME.get_or_init(Instant::now);
}

fn get_uptime_secs() -> u64 {
    START_TIME.get().map(|t| t.elapsed().as_secs()).unwrap_or(0)
}

/// Liveness: answers as long as the process serves requests.
#[utoipa::path(
    get,
    path = "/api/v1/status",
    responses(
        (status = 200, description = "Service is running", body = StatusResponse)
    ),
    tag = "health"
)]
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: ComponentStatus::Up,
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.config.environment.clone(),
        uptime_secs: get_uptime_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Readiness: pings the database. 503 when the store is unreachable.
#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Database reachable", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let start = Instant::now();
    let db_result = crate::db::check_connection(&state.db).await;
    let latency = start.elapsed().as_millis() as u64;

    let (code, database, message) = match db_result {
        Ok(()) => (StatusCode::OK, ComponentStatus::Up, None),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            ComponentStatus::Down,
            Some(e.response_message()),
        ),
    };

    (
        code,
        Json(HealthResponse {
            status: database,
            database,
            database_latency_ms: latency,
            message,
            gateway_base_url: state.config.gateway_base_url.clone(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }),
    )
}
