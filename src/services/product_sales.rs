//! SKU rollup: per-date sales of a product family summed across every marketplace code.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::{product_sales, registered_product};
use crate::errors::ServiceError;
use crate::gateway::MarketplaceGateway;
use crate::models::{DateRange, Mall};
use crate::services::products::ProductService;

/// Which registrations to roll up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductTarget {
    /// Every registration sharing this product name
    Family(String),
    Single(Uuid),
    Subset(Vec<Uuid>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSalesQuery {
    pub target: ProductTarget,
    pub range: DateRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductSalesPoint {
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    pub sales: Decimal,
    pub quantity: i64,
}

/// A mall whose remote fetch failed and therefore contributed nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FailedMall {
    pub product_id: Uuid,
    pub mall: Mall,
    pub code: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductSalesSummary {
    pub range: DateRange,
    pub product_ids: Vec<Uuid>,
    pub series: Vec<ProductSalesPoint>,
    pub total_sales: Decimal,
    pub total_quantity: i64,
    pub failed_malls: Vec<FailedMall>,
}

/// Sums sales and quantity per date; output is date ascending.
pub fn merge_product_sales<I>(rows: I) -> Vec<ProductSalesPoint>
where
    I: IntoIterator<Item = ProductSalesPoint>,
{
    let mut by_date: BTreeMap<NaiveDate, (Decimal, i64)> = BTreeMap::new();
    for row in rows {
        let entry = by_date.entry(row.date).or_insert((Decimal::ZERO, 0));
        entry.0 += row.sales;
        entry.1 += row.quantity;
    }
    by_date
        .into_iter()
        .map(|(date, (sales, quantity))| ProductSalesPoint {
            date,
            sales,
            quantity,
        })
        .collect()
}

#[derive(Clone)]
pub struct ProductSalesService {
    db: Arc<DatabaseConnection>,
    products: ProductService,
    gateway: Arc<dyn MarketplaceGateway>,
}

impl ProductSalesService {
    pub fn new(db: Arc<DatabaseConnection>, gateway: Arc<dyn MarketplaceGateway>) -> Self {
        Self {
            products: ProductService::new(db.clone()),
            db,
            gateway,
        }
    }

    async fn resolve(
        &self,
        target: &ProductTarget,
    ) -> Result<Vec<registered_product::Model>, ServiceError> {
        match target {
            ProductTarget::Family(name) => {
                let family = self.products.family(name).await?;
                if family.is_empty() {
                    return Err(ServiceError::NotFound(format!(
                        "No products registered under '{}'",
                        name.trim()
                    )));
                }
                Ok(family)
            }
            ProductTarget::Single(id) => Ok(vec![self.products.get(*id).await?]),
            ProductTarget::Subset(ids) => {
                if ids.is_empty() {
                    return Err(ServiceError::ValidationError(
                        "productIds must name at least one product".to_string(),
                    ));
                }
                self.products.get_many(ids).await
            }
        }
    }

    /// Stored rows for one code, or an empty vec when none were synced for the range.
    async fn cached_rows(
        &self,
        mall: Mall,
        code: &str,
        range: &DateRange,
    ) -> Result<Vec<ProductSalesPoint>, ServiceError> {
        let rows = product_sales::Entity::find()
            .filter(product_sales::Column::Code.eq(code))
            .filter(product_sales::Column::Mall.eq(mall))
            .filter(product_sales::Column::Date.gte(range.start_date))
            .filter(product_sales::Column::Date.lte(range.end_date))
            .order_by_asc(product_sales::Column::Date)
            .all(&*self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| ProductSalesPoint {
                date: row.date,
                sales: row.sales,
                quantity: row.quantity,
            })
            .collect())
    }

    /// Rolls up sales for the targeted registrations.
    ///
    /// Each code is served from stored rows when any exist for the range, otherwise
    /// fetched remotely. Remote failures are reported, not raised.
    #[instrument(skip(self))]
    pub async fn aggregate(
        &self,
        query: ProductSalesQuery,
    ) -> Result<ProductSalesSummary, ServiceError> {
        let range = query.range;
        let products = self.resolve(&query.target).await?;

        let mut rows = Vec::new();
        let mut failed_malls = Vec::new();

        for product in &products {
            for (mall, code) in product.mall_codes() {
                let cached = self.cached_rows(mall, &code, &range).await?;
                if !cached.is_empty() {
                    debug!(product_id = %product.id, mall = mall.as_str(), rows = cached.len(), "Using stored product sales");
                    rows.extend(cached);
                    continue;
                }

                match self.gateway.fetch_product_sales(mall, &code, range).await {
                    Ok(remote) => rows.extend(
                        remote
                            .into_iter()
                            .filter(|row| range.contains(row.date))
                            .map(|row| ProductSalesPoint {
                                date: row.date,
                                sales: row.sales,
                                quantity: row.quantity,
                            }),
                    ),
                    Err(e) => {
                        warn!(
                            product_id = %product.id,
                            mall = mall.as_str(),
                            code = %code,
                            error = %e,
                            "Remote product sales fetch failed; counting mall as zero"
                        );
                        failed_malls.push(FailedMall {
                            product_id: product.id,
                            mall,
                            code,
                            error: e.to_string(),
                        });
                    }
                }
            }
        }

        let series = merge_product_sales(rows);
        let total_sales = series.iter().map(|p| p.sales).sum();
        let total_quantity = series.iter().map(|p| p.quantity).sum();

        Ok(ProductSalesSummary {
            range,
            product_ids: products.iter().map(|p| p.id).collect(),
            series,
            total_sales,
            total_quantity,
            failed_malls,
        })
    }
}
