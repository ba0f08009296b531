use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Mall;

/// Maps one logical product (optionally one SKU of it) to its item code on each mall.
///
/// Several rows may share a `product_name`; together they form a product family.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "registered_products")]
#[serde(rename_all = "camelCase")]
#[schema(as = ProductSkuMapping)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub product_name: String,

    /// Free-form label distinguishing SKUs within a family
    pub sku_name: Option<String>,

    pub amazon_code: Option<String>,
    pub rakuten_code: Option<String>,
    pub qoo10_code: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model {
    pub fn code_for(&self, mall: Mall) -> Option<&str> {
        match mall {
            Mall::Amazon => self.amazon_code.as_deref(),
            Mall::Rakuten => self.rakuten_code.as_deref(),
            Mall::Qoo10 => self.qoo10_code.as_deref(),
        }
    }

    /// Configured (mall, code) pairs in stacking order.
    pub fn mall_codes(&self) -> Vec<(Mall, String)> {
        Mall::ALL
            .into_iter()
            .filter_map(|mall| self.code_for(mall).map(|code| (mall, code.to_string())))
            .collect()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
