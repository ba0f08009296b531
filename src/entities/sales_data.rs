use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{AdChannel, Mall};

/// One day of sales and ad spend across every mall and ad channel.
///
/// `date` is not unique; repeated syncs may store the same day more than once.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "sales_data")]
#[serde(rename_all = "camelCase")]
#[schema(as = DailySalesRecord)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,

    pub amazon_sales: Decimal,
    pub rakuten_sales: Decimal,
    pub qoo10_sales: Decimal,

    pub amazon_ad_cost: Decimal,
    pub rakuten_ad_cost: Decimal,
    pub qoo10_ad_cost: Decimal,
    pub x_ad_cost: Decimal,
    pub tiktok_ad_cost: Decimal,

    pub created_at: DateTime<Utc>,
}

impl Model {
    pub fn sales(&self, mall: Mall) -> Decimal {
        match mall {
            Mall::Amazon => self.amazon_sales,
            Mall::Rakuten => self.rakuten_sales,
            Mall::Qoo10 => self.qoo10_sales,
        }
    }

    pub fn ad_cost(&self, channel: AdChannel) -> Decimal {
        match channel {
            AdChannel::Amazon => self.amazon_ad_cost,
            AdChannel::Rakuten => self.rakuten_ad_cost,
            AdChannel::Qoo10 => self.qoo10_ad_cost,
            AdChannel::X => self.x_ad_cost,
            AdChannel::Tiktok => self.tiktok_ad_cost,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
