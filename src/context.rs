//! Per-request context handed to mutating handlers.

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use std::convert::Infallible;

use crate::tracing::{current_request_id, RequestId};

/// Header carrying a free-form label for whoever is operating the dashboard.
pub const OPERATOR_HEADER: &str = "x-operator";

const MAX_OPERATOR_LEN: usize = 64;

/// Request id plus the optional operator label, built fresh for every request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: RequestId,
    pub operator: Option<String>,
}

impl RequestContext {
    pub fn operator_label(&self) -> &str {
        self.operator.as_deref().unwrap_or("anonymous")
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let request_id = parts
            .extensions
            .get::<RequestId>()
            .cloned()
            .or_else(current_request_id)
            .unwrap_or_default();

        let operator = parts
            .headers
            .get(OPERATOR_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| v.chars().take(MAX_OPERATOR_LEN).collect());

        Ok(Self {
            request_id,
            operator,
        })
    }
}
