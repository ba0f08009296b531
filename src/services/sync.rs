//! Pulls marketplace data through the gateway and persists it locally.

use chrono::{NaiveDate, Utc};
use metrics::counter;
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::entities::product_sales;
use crate::errors::ServiceError;
use crate::gateway::{MarketplaceGateway, RemoteDailySales};
use crate::models::{AdChannel, DateRange, Mall, MallSelection};
use crate::services::products::ProductService;
use crate::services::sales_data::{NewDailySales, SalesDataService};

const INSERT_CHUNK: usize = 100;

/// One per-code daily sales row to persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewProductSales {
    #[validate(
        length(min = 1, max = 100, message = "code is required"),
        custom = "crate::models::not_blank"
    )]
    pub code: String,
    pub mall: Mall,
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    #[serde(default)]
    pub sales: Decimal,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MallSyncCount {
    pub mall: Mall,
    pub rows: usize,
}

/// A mall that failed during sync; the others still ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncFailure {
    pub mall: Mall,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductSyncReport {
    pub product_id: Uuid,
    pub range: DateRange,
    pub synced: Vec<MallSyncCount>,
    pub total_rows: usize,
    pub errors: Vec<SyncFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailySyncReport {
    pub range: DateRange,
    /// Rows fetched per mall before merging by date
    pub fetched: Vec<MallSyncCount>,
    /// Merged per-date rows written to the store
    pub days_saved: usize,
    pub errors: Vec<SyncFailure>,
}

/// Folds per-mall remote rows into one row per date.
///
/// Each mall's sales land in its sales column and its ad cost in the mall's own ad channel.
pub fn merge_daily_sales<I>(rows: I) -> Vec<NewDailySales>
where
    I: IntoIterator<Item = (Mall, NaiveDate, Decimal, Decimal)>,
{
    let mut by_date: BTreeMap<NaiveDate, NewDailySales> = BTreeMap::new();
    for (mall, date, sales, ad_cost) in rows {
        let day = by_date
            .entry(date)
            .or_insert_with(|| NewDailySales::zero(date));
        day.add_sales(mall, sales);
        day.add_ad_cost(AdChannel::from(mall), ad_cost);
    }
    by_date.into_values().collect()
}

/// Rejects the batch if any row is invalid or carries a negative amount.
fn check_product_rows(rows: &[NewProductSales]) -> Result<(), ServiceError> {
    for row in rows {
        row.validate()?;
        if row.sales.is_sign_negative() {
            return Err(ServiceError::ValidationError(format!(
                "sales for {} on {} must not be negative",
                row.code, row.date
            )));
        }
    }
    Ok(())
}

fn check_daily_rows(mall: Mall, rows: &[RemoteDailySales]) -> Result<(), ServiceError> {
    match rows
        .iter()
        .find(|row| row.sales.is_sign_negative() || row.ad_cost.is_sign_negative())
    {
        Some(row) => Err(ServiceError::ValidationError(format!(
            "{} reported a negative amount on {}",
            mall.as_str(),
            row.date
        ))),
        None => Ok(()),
    }
}

fn sync_failure(mall: Mall, code: Option<String>, error: String) -> SyncFailure {
    warn!(mall = mall.as_str(), code = ?code, error = %error, "Sync failed for mall");
    counter!("mallboard.sync.failures", 1, "mall" => mall.as_str());
    SyncFailure { mall, code, error }
}

#[derive(Clone)]
pub struct SyncService {
    db: Arc<DatabaseConnection>,
    products: ProductService,
    sales_data: SalesDataService,
    gateway: Arc<dyn MarketplaceGateway>,
}

impl SyncService {
    pub fn new(db: Arc<DatabaseConnection>, gateway: Arc<dyn MarketplaceGateway>) -> Self {
        Self {
            products: ProductService::new(db.clone()),
            sales_data: SalesDataService::new(db.clone()),
            db,
            gateway,
        }
    }

    /// Inserts product sales rows as given. Re-saving the same rows duplicates them.
    #[instrument(skip(self, rows), fields(count = rows.len()))]
    pub async fn save_product_sales(&self, rows: Vec<NewProductSales>) -> Result<usize, ServiceError> {
        check_product_rows(&rows)?;
        if rows.is_empty() {
            return Ok(0);
        }

        let now = Utc::now();
        let total = rows.len();
        let models: Vec<product_sales::ActiveModel> = rows
            .into_iter()
            .map(|row| product_sales::ActiveModel {
                id: Set(Uuid::new_v4()),
                code: Set(row.code.trim().to_string()),
                mall: Set(row.mall),
                date: Set(row.date),
                sales: Set(row.sales),
                quantity: Set(row.quantity),
                created_at: Set(now),
            })
            .collect();

        for chunk in models.chunks(INSERT_CHUNK) {
            product_sales::Entity::insert_many(chunk.to_vec())
                .exec(&*self.db)
                .await?;
        }

        counter!("mallboard.sync.product_sales_rows", total as u64);
        info!(rows = total, "Saved product sales rows");
        Ok(total)
    }

    /// Fetches every configured code of one product and stores the rows.
    #[instrument(skip(self))]
    pub async fn sync_product(
        &self,
        product_id: Uuid,
        range: DateRange,
    ) -> Result<ProductSyncReport, ServiceError> {
        let product = self.products.get(product_id).await?;

        let mut synced = Vec::new();
        let mut errors = Vec::new();

        for (mall, code) in product.mall_codes() {
            let remote = match self.gateway.fetch_product_sales(mall, &code, range).await {
                Ok(remote) => remote,
                Err(e) => {
                    errors.push(sync_failure(mall, Some(code), e.to_string()));
                    continue;
                }
            };

            let rows: Vec<NewProductSales> = remote
                .into_iter()
                .filter(|row| range.contains(row.date))
                .map(|row| NewProductSales {
                    code: code.clone(),
                    mall,
                    date: row.date,
                    sales: row.sales,
                    quantity: row.quantity,
                })
                .collect();

            // a bad payload fails this mall only; store errors still abort
            if let Err(e) = check_product_rows(&rows) {
                errors.push(sync_failure(mall, Some(code), e.to_string()));
                continue;
            }

            let saved = self.save_product_sales(rows).await?;
            synced.push(MallSyncCount { mall, rows: saved });
        }

        let total_rows = synced.iter().map(|s| s.rows).sum();
        info!(product_id = %product_id, total_rows, failures = errors.len(), "Product sync finished");

        Ok(ProductSyncReport {
            product_id,
            range,
            synced,
            total_rows,
            errors,
        })
    }

    /// Fetches mall-wide daily sales for the selected malls, merges them by date and stores them.
    #[instrument(skip(self))]
    pub async fn sync_daily_sales(
        &self,
        range: DateRange,
        malls: MallSelection,
    ) -> Result<DailySyncReport, ServiceError> {
        let mut fetched = Vec::new();
        let mut errors = Vec::new();
        let mut remote_rows = Vec::new();

        for mall in malls.selected() {
            let rows: Vec<RemoteDailySales> = match self.gateway.fetch_daily_sales(mall, range).await
            {
                Ok(rows) => rows
                    .into_iter()
                    .filter(|row| range.contains(row.date))
                    .collect(),
                Err(e) => {
                    errors.push(sync_failure(mall, None, e.to_string()));
                    continue;
                }
            };

            if let Err(e) = check_daily_rows(mall, &rows) {
                errors.push(sync_failure(mall, None, e.to_string()));
                continue;
            }

            fetched.push(MallSyncCount {
                mall,
                rows: rows.len(),
            });
            remote_rows.extend(
                rows.into_iter()
                    .map(|row| (mall, row.date, row.sales, row.ad_cost)),
            );
        }

        let merged = merge_daily_sales(remote_rows);
        let stored = self.sales_data.create_many(merged).await?;
        counter!("mallboard.sync.daily_sales_rows", stored.len() as u64);
        info!(days_saved = stored.len(), failures = errors.len(), "Daily sales sync finished");

        Ok(DailySyncReport {
            range,
            fetched,
            days_saved: stored.len(),
            errors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{GatewayError, MockMarketplaceGateway, RemoteProductSales};
    use crate::services::products::ProductInput;
    use crate::services::test_support::test_db;
    use rust_decimal_macros::dec;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn january() -> DateRange {
        DateRange::new(day("2024-01-01"), day("2024-01-31")).unwrap()
    }

    #[test]
    fn merge_daily_sales_routes_ad_cost_to_mall_channel() {
        let merged = merge_daily_sales(vec![
            (Mall::Amazon, day("2024-01-02"), dec!(100), dec!(10)),
            (Mall::Qoo10, day("2024-01-01"), dec!(30), dec!(3)),
            (Mall::Rakuten, day("2024-01-02"), dec!(200), dec!(20)),
        ]);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].date, day("2024-01-01"));
        assert_eq!(merged[0].qoo10_ad_cost, dec!(3));
        assert_eq!(merged[1].amazon_sales, dec!(100));
        assert_eq!(merged[1].rakuten_sales, dec!(200));
        assert_eq!(merged[1].rakuten_ad_cost, dec!(20));
        assert_eq!(merged[1].x_ad_cost, Decimal::ZERO);
    }

    #[tokio::test]
    async fn failing_mall_does_not_block_the_others() {
        let (_dir, db) = test_db().await;
        let product = ProductService::new(db.clone())
            .create(ProductInput {
                product_name: "Serum".into(),
                amazon_code: Some("A-1".into()),
                rakuten_code: Some("R-1".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        let mut gateway = MockMarketplaceGateway::new();
        gateway
            .expect_fetch_product_sales()
            .withf(|mall, _, _| *mall == Mall::Amazon)
            .times(1)
            .returning(|_, _, _| {
                Err(GatewayError::Decode("unexpected token".into()))
            });
        gateway
            .expect_fetch_product_sales()
            .withf(|mall, _, _| *mall == Mall::Rakuten)
            .times(1)
            .returning(|_, _, _| {
                Ok(vec![
                    RemoteProductSales {
                        date: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
                        sales: dec!(80),
                        quantity: 2,
                    },
                    RemoteProductSales {
                        date: NaiveDate::from_ymd_opt(2024, 1, 4).unwrap(),
                        sales: dec!(40),
                        quantity: 1,
                    },
                ])
            });

        let report = SyncService::new(db, Arc::new(gateway))
            .sync_product(product.id, january())
            .await
            .unwrap();

        assert_eq!(
            report.synced,
            vec![MallSyncCount {
                mall: Mall::Rakuten,
                rows: 2
            }]
        );
        assert_eq!(report.total_rows, 2);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].mall, Mall::Amazon);
        assert_eq!(report.errors[0].code.as_deref(), Some("A-1"));
    }

    #[tokio::test]
    async fn daily_sync_merges_selected_malls_only() {
        let (_dir, db) = test_db().await;

        let mut gateway = MockMarketplaceGateway::new();
        gateway
            .expect_fetch_daily_sales()
            .withf(|mall, _| *mall == Mall::Amazon)
            .times(1)
            .returning(|_, _| {
                Ok(vec![RemoteDailySales {
                    date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
                    sales: dec!(500),
                    ad_cost: dec!(50),
                }])
            });
        gateway
            .expect_fetch_daily_sales()
            .withf(|mall, _| *mall == Mall::Qoo10)
            .times(1)
            .returning(|_, _| {
                Ok(vec![RemoteDailySales {
                    date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
                    sales: dec!(70),
                    ad_cost: dec!(7),
                }])
            });

        let service = SyncService::new(db.clone(), Arc::new(gateway));
        let report = service
            .sync_daily_sales(january(), MallSelection::only(&[Mall::Amazon, Mall::Qoo10]))
            .await
            .unwrap();

        assert_eq!(report.days_saved, 1);
        assert!(report.errors.is_empty());

        let stored = SalesDataService::new(db).list(january()).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].amazon_sales, dec!(500));
        assert_eq!(stored[0].qoo10_sales, dec!(70));
        assert_eq!(stored[0].qoo10_ad_cost, dec!(7));
        assert_eq!(stored[0].rakuten_sales, Decimal::ZERO);
    }

    #[tokio::test]
    async fn negative_remote_rows_fail_only_their_mall() {
        let (_dir, db) = test_db().await;
        let product = ProductService::new(db.clone())
            .create(ProductInput {
                product_name: "Toner".into(),
                amazon_code: Some("A-2".into()),
                rakuten_code: Some("R-2".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        let mut gateway = MockMarketplaceGateway::new();
        gateway
            .expect_fetch_product_sales()
            .withf(|mall, _, _| *mall == Mall::Amazon)
            .times(1)
            .returning(|_, _, _| {
                Ok(vec![RemoteProductSales {
                    date: day("2024-01-03"),
                    sales: dec!(-500),
                    quantity: -1,
                }])
            });
        gateway
            .expect_fetch_product_sales()
            .withf(|mall, _, _| *mall == Mall::Rakuten)
            .times(1)
            .returning(|_, _, _| {
                Ok(vec![RemoteProductSales {
                    date: day("2024-01-03"),
                    sales: dec!(120),
                    quantity: 3,
                }])
            });

        let report = SyncService::new(db.clone(), Arc::new(gateway))
            .sync_product(product.id, january())
            .await
            .unwrap();

        assert_eq!(
            report.synced,
            vec![MallSyncCount {
                mall: Mall::Rakuten,
                rows: 1
            }]
        );
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].mall, Mall::Amazon);
        assert_eq!(report.errors[0].code.as_deref(), Some("A-2"));

        let stored = product_sales::Entity::find().all(db.as_ref()).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].code, "R-2");
    }

    #[tokio::test]
    async fn daily_sync_skips_a_mall_reporting_negative_ad_cost() {
        let (_dir, db) = test_db().await;

        let mut gateway = MockMarketplaceGateway::new();
        gateway
            .expect_fetch_daily_sales()
            .withf(|mall, _| *mall == Mall::Amazon)
            .times(1)
            .returning(|_, _| {
                Ok(vec![RemoteDailySales {
                    date: day("2024-01-06"),
                    sales: dec!(300),
                    ad_cost: dec!(-5),
                }])
            });
        gateway
            .expect_fetch_daily_sales()
            .withf(|mall, _| *mall == Mall::Rakuten)
            .times(1)
            .returning(|_, _| {
                Ok(vec![RemoteDailySales {
                    date: day("2024-01-06"),
                    sales: dec!(90),
                    ad_cost: dec!(9),
                }])
            });

        let report = SyncService::new(db.clone(), Arc::new(gateway))
            .sync_daily_sales(january(), MallSelection::only(&[Mall::Amazon, Mall::Rakuten]))
            .await
            .unwrap();

        assert_eq!(
            report.fetched,
            vec![MallSyncCount {
                mall: Mall::Rakuten,
                rows: 1
            }]
        );
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].mall, Mall::Amazon);
        assert!(report.errors[0].code.is_none());

        let stored = SalesDataService::new(db).list(january()).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].amazon_sales, Decimal::ZERO);
        assert_eq!(stored[0].amazon_ad_cost, Decimal::ZERO);
        assert_eq!(stored[0].rakuten_sales, dec!(90));
    }

    #[tokio::test]
    async fn daily_sync_reports_a_failing_mall_and_keeps_the_rest() {
        let (_dir, db) = test_db().await;

        let mut gateway = MockMarketplaceGateway::new();
        gateway
            .expect_fetch_daily_sales()
            .withf(|mall, _| *mall == Mall::Qoo10)
            .times(1)
            .returning(|_, _| {
                Err(GatewayError::Status {
                    status: 502,
                    body: "bad gateway".into(),
                })
            });
        gateway
            .expect_fetch_daily_sales()
            .withf(|mall, _| *mall == Mall::Amazon)
            .times(1)
            .returning(|_, _| {
                Ok(vec![RemoteDailySales {
                    date: day("2024-01-07"),
                    sales: dec!(410),
                    ad_cost: dec!(41),
                }])
            });

        let report = SyncService::new(db, Arc::new(gateway))
            .sync_daily_sales(january(), MallSelection::only(&[Mall::Amazon, Mall::Qoo10]))
            .await
            .unwrap();

        assert_eq!(report.days_saved, 1);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].mall, Mall::Qoo10);
    }

    #[tokio::test]
    async fn save_rejects_blank_codes_before_writing() {
        let (_dir, db) = test_db().await;
        let service = SyncService::new(db, Arc::new(MockMarketplaceGateway::new()));

        let result = service
            .save_product_sales(vec![NewProductSales {
                code: " ".into(),
                mall: Mall::Amazon,
                date: day("2024-01-01"),
                sales: dec!(1),
                quantity: 1,
            }])
            .await;
        assert!(matches!(result, Err(ServiceError::ValidationError(_))));
        assert_eq!(service.save_product_sales(Vec::new()).await.unwrap(), 0);
    }
}
