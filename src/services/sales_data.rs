use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::sales_data;
use crate::errors::ServiceError;
use crate::models::{AdChannel, DateRange, Mall};

/// Input for one stored day of sales. Omitted amounts are zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewDailySales {
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    #[serde(default)]
    pub amazon_sales: Decimal,
    #[serde(default)]
    pub rakuten_sales: Decimal,
    #[serde(default)]
    pub qoo10_sales: Decimal,
    #[serde(default)]
    pub amazon_ad_cost: Decimal,
    #[serde(default)]
    pub rakuten_ad_cost: Decimal,
    #[serde(default)]
    pub qoo10_ad_cost: Decimal,
    #[serde(default)]
    pub x_ad_cost: Decimal,
    #[serde(default)]
    pub tiktok_ad_cost: Decimal,
}

impl NewDailySales {
    pub fn zero(date: NaiveDate) -> Self {
        Self {
            date,
            ..Default::default()
        }
    }

    pub fn add_sales(&mut self, mall: Mall, amount: Decimal) {
        match mall {
            Mall::Amazon => self.amazon_sales += amount,
            Mall::Rakuten => self.rakuten_sales += amount,
            Mall::Qoo10 => self.qoo10_sales += amount,
        }
    }

    pub fn add_ad_cost(&mut self, channel: AdChannel, amount: Decimal) {
        match channel {
            AdChannel::Amazon => self.amazon_ad_cost += amount,
            AdChannel::Rakuten => self.rakuten_ad_cost += amount,
            AdChannel::Qoo10 => self.qoo10_ad_cost += amount,
            AdChannel::X => self.x_ad_cost += amount,
            AdChannel::Tiktok => self.tiktok_ad_cost += amount,
        }
    }

    fn has_negative_amount(&self) -> bool {
        [
            self.amazon_sales,
            self.rakuten_sales,
            self.qoo10_sales,
            self.amazon_ad_cost,
            self.rakuten_ad_cost,
            self.qoo10_ad_cost,
            self.x_ad_cost,
            self.tiktok_ad_cost,
        ]
        .iter()
        .any(Decimal::is_sign_negative)
    }
}

/// Store of mall-wide daily sales rows.
#[derive(Clone)]
pub struct SalesDataService {
    db: Arc<DatabaseConnection>,
}

impl SalesDataService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Rows within `range`, date ascending. Same-day rows keep insertion order.
    #[instrument(skip(self))]
    pub async fn list(&self, range: DateRange) -> Result<Vec<sales_data::Model>, ServiceError> {
        let rows = sales_data::Entity::find()
            .filter(sales_data::Column::Date.gte(range.start_date))
            .filter(sales_data::Column::Date.lte(range.end_date))
            .order_by_asc(sales_data::Column::Date)
            .order_by_asc(sales_data::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(rows)
    }

    /// Inserts a row. No deduplication by date.
    #[instrument(skip(self))]
    pub async fn create(&self, input: NewDailySales) -> Result<sales_data::Model, ServiceError> {
        if input.has_negative_amount() {
            return Err(ServiceError::ValidationError(
                "Sales and ad cost amounts must not be negative".to_string(),
            ));
        }

        let model = Self::active_model(input).insert(&*self.db).await?;
        info!(id = %model.id, date = %model.date, "Stored daily sales row");
        Ok(model)
    }

    /// Inserts many rows, one insert per row; returns the stored models.
    /// Nothing is written if any row carries a negative amount.
    #[instrument(skip(self, rows), fields(count = rows.len()))]
    pub async fn create_many(
        &self,
        rows: Vec<NewDailySales>,
    ) -> Result<Vec<sales_data::Model>, ServiceError> {
        if let Some(row) = rows.iter().find(|row| row.has_negative_amount()) {
            return Err(ServiceError::ValidationError(format!(
                "Sales and ad cost amounts must not be negative ({})",
                row.date
            )));
        }

        let mut stored = Vec::with_capacity(rows.len());
        for row in rows {
            stored.push(Self::active_model(row).insert(&*self.db).await?);
        }
        Ok(stored)
    }

    fn active_model(input: NewDailySales) -> sales_data::ActiveModel {
        sales_data::ActiveModel {
            id: Set(Uuid::new_v4()),
            date: Set(input.date),
            amazon_sales: Set(input.amazon_sales),
            rakuten_sales: Set(input.rakuten_sales),
            qoo10_sales: Set(input.qoo10_sales),
            amazon_ad_cost: Set(input.amazon_ad_cost),
            rakuten_ad_cost: Set(input.rakuten_ad_cost),
            qoo10_ad_cost: Set(input.qoo10_ad_cost),
            x_ad_cost: Set(input.x_ad_cost),
            tiktok_ad_cost: Set(input.tiktok_ad_cost),
            created_at: Set(Utc::now()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::test_db;
    use rust_decimal_macros::dec;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[tokio::test]
    async fn list_filters_inclusively_and_keeps_duplicates() {
        let (_dir, db) = test_db().await;
        let service = SalesDataService::new(db);

        for (date, amount) in [
            ("2024-01-31", dec!(3)),
            ("2024-01-01", dec!(1)),
            ("2024-01-01", dec!(2)),
            ("2024-02-01", dec!(9)),
        ] {
            service
                .create(NewDailySales {
                    amazon_sales: amount,
                    ..NewDailySales::zero(day(date))
                })
                .await
                .unwrap();
        }

        let rows = service
            .list(DateRange::new(day("2024-01-01"), day("2024-01-31")).unwrap())
            .await
            .unwrap();
        let amounts: Vec<_> = rows.iter().map(|r| r.amazon_sales).collect();
        assert_eq!(amounts, vec![dec!(1), dec!(2), dec!(3)]);
    }

    #[tokio::test]
    async fn negative_amounts_are_rejected() {
        let (_dir, db) = test_db().await;
        let service = SalesDataService::new(db);

        let result = service
            .create(NewDailySales {
                x_ad_cost: dec!(-1),
                ..NewDailySales::zero(day("2024-01-01"))
            })
            .await;
        assert!(matches!(result, Err(ServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn batch_with_a_negative_row_writes_nothing() {
        let (_dir, db) = test_db().await;
        let service = SalesDataService::new(db);

        let result = service
            .create_many(vec![
                NewDailySales {
                    amazon_sales: dec!(10),
                    ..NewDailySales::zero(day("2024-01-01"))
                },
                NewDailySales {
                    rakuten_ad_cost: dec!(-3),
                    ..NewDailySales::zero(day("2024-01-02"))
                },
            ])
            .await;
        assert!(matches!(result, Err(ServiceError::ValidationError(_))));

        let rows = service
            .list(DateRange::new(day("2024-01-01"), day("2024-01-31")).unwrap())
            .await
            .unwrap();
        assert!(rows.is_empty());
    }
}
