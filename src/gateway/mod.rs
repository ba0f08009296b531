//! Client side of the remote marketplace aggregation API.
//!
//! Services depend on [`MarketplaceGateway`] so they can be exercised against a mock;
//! [`HttpMarketplaceGateway`] is the reqwest-backed implementation used in production.

mod client;

pub use client::HttpMarketplaceGateway;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ServiceError;
use crate::models::{DateRange, Mall};

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("remote returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed payload: {0}")]
    Decode(String),

    #[error("invalid gateway URL: {0}")]
    Url(String),
}

impl From<GatewayError> for ServiceError {
    fn from(err: GatewayError) -> Self {
        ServiceError::ExternalServiceError(err.to_string())
    }
}

/// One day of sales for a single marketplace item code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteProductSales {
    pub date: NaiveDate,
    #[serde(default)]
    pub sales: Decimal,
    #[serde(default)]
    pub quantity: i64,
}

/// One day of mall-wide sales and ad spend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteDailySales {
    pub date: NaiveDate,
    #[serde(default)]
    pub sales: Decimal,
    #[serde(default)]
    pub ad_cost: Decimal,
}

/// `{ "data": [...] }` wrapper used by every list endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct DataEnvelope<T> {
    pub data: Option<Vec<T>>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketplaceGateway: Send + Sync {
    /// `GET {mall}/product-sales/{code}`
    async fn fetch_product_sales(
        &self,
        mall: Mall,
        code: &str,
        range: DateRange,
    ) -> Result<Vec<RemoteProductSales>, GatewayError>;

    /// `POST {mall}/sync-sales`
    async fn fetch_daily_sales(
        &self,
        mall: Mall,
        range: DateRange,
    ) -> Result<Vec<RemoteDailySales>, GatewayError>;

    async fn tiktok_accounts(&self, product_id: &str) -> Result<Value, GatewayError>;

    async fn register_tiktok_account(&self, payload: Value) -> Result<Value, GatewayError>;

    async fn bulk_register_tiktok_accounts(&self, payload: Value) -> Result<Value, GatewayError>;

    async fn delete_tiktok_account(&self, account_id: &str) -> Result<Value, GatewayError>;

    async fn tiktok_analytics(
        &self,
        product_id: &str,
        range: DateRange,
    ) -> Result<Value, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn remote_rows_default_missing_amounts_to_zero() {
        let rows: DataEnvelope<RemoteDailySales> =
            serde_json::from_str(r#"{"data":[{"date":"2024-03-01","sales":1200.5}]}"#).unwrap();
        let rows = rows.data.unwrap();
        assert_eq!(rows[0].sales, dec!(1200.5));
        assert_eq!(rows[0].ad_cost, Decimal::ZERO);
    }

    #[test]
    fn missing_data_key_is_none() {
        let rows: DataEnvelope<RemoteProductSales> = serde_json::from_str("{}").unwrap();
        assert!(rows.data.is_none());
    }

    #[test]
    fn null_data_is_accepted() {
        let rows: DataEnvelope<RemoteProductSales> =
            serde_json::from_str(r#"{"data":null}"#).unwrap();
        assert!(rows.data.is_none());
    }

    #[test]
    fn gateway_errors_surface_as_bad_gateway() {
        let err: ServiceError = GatewayError::Status {
            status: 503,
            body: "down".into(),
        }
        .into();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_GATEWAY);
    }
}
