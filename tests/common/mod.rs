use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    middleware, Router,
};
use mallboard_api::{
    api_v1_routes,
    config::AppConfig,
    db,
    gateway::{HttpMarketplaceGateway, MarketplaceGateway},
    handlers::AppServices,
    middleware_helpers::request_id_middleware,
    AppState,
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::MockServer;

/// Helper harness for spinning up an application backed by a throwaway SQLite file
/// and a wiremock stand-in for the remote aggregation API.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub remote: MockServer,
    _db_dir: TempDir,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let db_dir = tempfile::tempdir().expect("temp dir");
        let remote = MockServer::start().await;

        let mut cfg = AppConfig::new(
            format!(
                "sqlite://{}?mode=rwc",
                db_dir.path().join("mallboard_test.db").display()
            ),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.gateway_base_url = format!("{}/api", remote.uri());
        cfg.gateway_timeout_secs = 5;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");
        let db_arc = Arc::new(pool);

        let gateway: Arc<dyn MarketplaceGateway> = Arc::new(
            HttpMarketplaceGateway::new(&cfg.gateway_base_url, Duration::from_secs(5))
                .expect("gateway for tests"),
        );

        let state = AppState {
            db: db_arc.clone(),
            config: cfg,
            services: AppServices::new(db_arc, gateway),
        };

        let router = Router::new()
            .nest("/api/v1", api_v1_routes())
            .layer(middleware::from_fn(request_id_middleware))
            .with_state(state.clone());

        Self {
            router,
            state,
            remote,
            _db_dir: db_dir,
        }
    }

    /// Send a request against the router.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        self.request_with_headers(method, uri, body, &[]).await
    }

    pub async fn request_with_headers(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Sends a request and decodes the JSON body alongside the status.
    pub async fn json(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let response = self.request(method, uri, body).await;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, value)
    }
}
