use async_trait::async_trait;
use metrics::counter;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use super::{DataEnvelope, GatewayError, MarketplaceGateway, RemoteDailySales, RemoteProductSales};
use crate::config::AppConfig;
use crate::models::{DateRange, Mall};
use crate::tracing::with_metrics;

const MAX_ERROR_BODY: usize = 512;

/// reqwest client for the remote aggregation API. One attempt per call, no retries.
#[derive(Clone, Debug)]
pub struct HttpMarketplaceGateway {
    client: Client,
    base_url: Url,
}

impl HttpMarketplaceGateway {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, GatewayError> {
        let base_url = Url::parse(base_url).map_err(|e| GatewayError::Url(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::Url(format!("{} cannot be a base URL", base_url)));
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("mallboard-api/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, GatewayError> {
        Self::new(&config.gateway_base_url, config.gateway_timeout())
    }

    /// Appends percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GatewayError::Url(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn range_query(range: &DateRange) -> [(&'static str, String); 2] {
        [
            ("startDate", range.start_date.to_string()),
            ("endDate", range.end_date.to_string()),
        ]
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
    let status = response.status();
    if !status.is_success() {
        let mut body = response.text().await.unwrap_or_default();
        if body.len() > MAX_ERROR_BODY {
            let cut = (0..=MAX_ERROR_BODY)
                .rev()
                .find(|i| body.is_char_boundary(*i))
                .unwrap_or(0);
            body.truncate(cut);
        }
        return Err(GatewayError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| GatewayError::Decode(e.to_string()))
}

async fn decode_rows<T: DeserializeOwned>(response: Response) -> Result<Vec<T>, GatewayError> {
    let envelope: DataEnvelope<T> = decode(response).await?;
    Ok(envelope.data.unwrap_or_default())
}

#[async_trait]
impl MarketplaceGateway for HttpMarketplaceGateway {
    #[instrument(skip(self), fields(mall = mall.as_str()))]
    async fn fetch_product_sales(
        &self,
        mall: Mall,
        code: &str,
        range: DateRange,
    ) -> Result<Vec<RemoteProductSales>, GatewayError> {
        let url = self.endpoint(&[mall.as_str(), "product-sales", code])?;
        counter!("mallboard.gateway.requests", 1, "endpoint" => "product_sales");

        let rows = with_metrics("gateway.product_sales", || async {
            let response = self
                .client
                .get(url)
                .query(&Self::range_query(&range))
                .send()
                .await?;
            decode_rows::<RemoteProductSales>(response).await
        })
        .await?;

        debug!(rows = rows.len(), "Fetched remote product sales");
        Ok(rows)
    }

    #[instrument(skip(self), fields(mall = mall.as_str()))]
    async fn fetch_daily_sales(
        &self,
        mall: Mall,
        range: DateRange,
    ) -> Result<Vec<RemoteDailySales>, GatewayError> {
        let url = self.endpoint(&[mall.as_str(), "sync-sales"])?;
        counter!("mallboard.gateway.requests", 1, "endpoint" => "sync_sales");

        let rows = with_metrics("gateway.sync_sales", || async {
            let response = self.client.post(url).json(&range).send().await?;
            decode_rows::<RemoteDailySales>(response).await
        })
        .await?;

        debug!(rows = rows.len(), "Fetched remote daily sales");
        Ok(rows)
    }

    #[instrument(skip(self))]
    async fn tiktok_accounts(&self, product_id: &str) -> Result<Value, GatewayError> {
        let url = self.endpoint(&["tiktok", "accounts", product_id])?;
        counter!("mallboard.gateway.requests", 1, "endpoint" => "tiktok_accounts");
        decode(self.client.get(url).send().await?).await
    }

    #[instrument(skip(self, payload))]
    async fn register_tiktok_account(&self, payload: Value) -> Result<Value, GatewayError> {
        let url = self.endpoint(&["tiktok", "accounts", "register"])?;
        counter!("mallboard.gateway.requests", 1, "endpoint" => "tiktok_register");
        decode(self.client.post(url).json(&payload).send().await?).await
    }

    #[instrument(skip(self, payload))]
    async fn bulk_register_tiktok_accounts(&self, payload: Value) -> Result<Value, GatewayError> {
        let url = self.endpoint(&["tiktok", "accounts", "bulk-register-v2"])?;
        counter!("mallboard.gateway.requests", 1, "endpoint" => "tiktok_bulk_register");
        decode(self.client.post(url).json(&payload).send().await?).await
    }

    #[instrument(skip(self))]
    async fn delete_tiktok_account(&self, account_id: &str) -> Result<Value, GatewayError> {
        let url = self.endpoint(&["tiktok", "accounts", account_id])?;
        counter!("mallboard.gateway.requests", 1, "endpoint" => "tiktok_delete");
        decode(self.client.delete(url).send().await?).await
    }

    #[instrument(skip(self))]
    async fn tiktok_analytics(
        &self,
        product_id: &str,
        range: DateRange,
    ) -> Result<Value, GatewayError> {
        let url = self.endpoint(&["tiktok", "analytics", product_id])?;
        counter!("mallboard.gateway.requests", 1, "endpoint" => "tiktok_analytics");
        let response = self
            .client
            .get(url)
            .query(&Self::range_query(&range))
            .send()
            .await?;
        decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn january() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )
        .unwrap()
    }

    fn gateway(server: &MockServer) -> HttpMarketplaceGateway {
        HttpMarketplaceGateway::new(&format!("{}/api", server.uri()), Duration::from_secs(5))
            .unwrap()
    }

    #[test]
    fn endpoint_encodes_codes_as_single_segments() {
        let gw = HttpMarketplaceGateway::new("http://remote.test/api/", Duration::from_secs(1))
            .unwrap();
        let url = gw
            .endpoint(&["rakuten", "product-sales", "shop:item/01"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://remote.test/api/rakuten/product-sales/shop:item%2F01"
        );
    }

    #[test]
    fn rejects_non_base_urls() {
        assert!(matches!(
            HttpMarketplaceGateway::new("mailto:ops@example.com", Duration::from_secs(1)),
            Err(GatewayError::Url(_))
        ));
    }

    #[tokio::test]
    async fn fetches_product_sales_with_range_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/amazon/product-sales/B0TEST"))
            .and(query_param("startDate", "2024-01-01"))
            .and(query_param("endDate", "2024-01-31"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {"date": "2024-01-02", "sales": 1500, "quantity": 3},
                    {"date": "2024-01-03", "sales": 980.5, "quantity": 1}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let rows = gateway(&server)
            .fetch_product_sales(Mall::Amazon, "B0TEST", january())
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].sales, dec!(1500));
        assert_eq!(rows[1].quantity, 1);
    }

    #[tokio::test]
    async fn posts_range_to_sync_sales() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/qoo10/sync-sales"))
            .and(body_json(json!({"startDate": "2024-01-01", "endDate": "2024-01-31"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"date": "2024-01-05", "sales": 300, "adCost": 40}]
            })))
            .mount(&server)
            .await;

        let rows = gateway(&server)
            .fetch_daily_sales(Mall::Qoo10, january())
            .await
            .unwrap();

        assert_eq!(rows[0].ad_cost, dec!(40));
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .mount(&server)
            .await;

        let err = gateway(&server)
            .fetch_product_sales(Mall::Rakuten, "r-1", january())
            .await
            .unwrap_err();

        match err {
            GatewayError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "upstream exploded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_payload_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
            .mount(&server)
            .await;

        let err = gateway(&server)
            .fetch_product_sales(Mall::Amazon, "A1", january())
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Decode(_)));
    }

    #[tokio::test]
    async fn tiktok_delete_passes_json_through() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/tiktok/accounts/acc-9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .mount(&server)
            .await;

        let body = gateway(&server).delete_tiktok_account("acc-9").await.unwrap();
        assert_eq!(body, json!({"success": true}));
    }
}
