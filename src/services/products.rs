use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::entities::registered_product;
use crate::errors::ServiceError;

/// A product/SKU registration. Blank codes are stored as missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    #[validate(
        length(min = 1, max = 255, message = "Product name is required"),
        custom = "crate::models::not_blank"
    )]
    pub product_name: String,
    #[validate(length(max = 255))]
    pub sku_name: Option<String>,
    #[validate(length(max = 100))]
    pub amazon_code: Option<String>,
    #[validate(length(max = 100))]
    pub rakuten_code: Option<String>,
    #[validate(length(max = 100))]
    pub qoo10_code: Option<String>,
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Registry mapping products to their marketplace item codes.
#[derive(Clone)]
pub struct ProductService {
    db: Arc<DatabaseConnection>,
}

impl ProductService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn create(
        &self,
        input: ProductInput,
    ) -> Result<registered_product::Model, ServiceError> {
        input.validate()?;

        let product = registered_product::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_name: Set(input.product_name.trim().to_string()),
            sku_name: Set(normalize(input.sku_name)),
            amazon_code: Set(normalize(input.amazon_code)),
            rakuten_code: Set(normalize(input.rakuten_code)),
            qoo10_code: Set(normalize(input.qoo10_code)),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(&*self.db)
        .await?;

        info!(product_id = %product.id, product_name = %product.product_name, "Product registered");
        Ok(product)
    }

    /// All registrations, optionally limited to one product family.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        product_name: Option<&str>,
    ) -> Result<Vec<registered_product::Model>, ServiceError> {
        let mut query = registered_product::Entity::find();
        if let Some(name) = product_name.map(str::trim).filter(|n| !n.is_empty()) {
            query = query.filter(registered_product::Column::ProductName.eq(name));
        }

        let products = query
            .order_by_asc(registered_product::Column::ProductName)
            .order_by_asc(registered_product::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(products)
    }

    /// Every SKU registered under `product_name`.
    #[instrument(skip(self))]
    pub async fn family(
        &self,
        product_name: &str,
    ) -> Result<Vec<registered_product::Model>, ServiceError> {
        let products = registered_product::Entity::find()
            .filter(registered_product::Column::ProductName.eq(product_name.trim()))
            .order_by_asc(registered_product::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(products)
    }

    /// Distinct product family names, alphabetical.
    #[instrument(skip(self))]
    pub async fn product_names(&self) -> Result<Vec<String>, ServiceError> {
        let names = registered_product::Entity::find()
            .select_only()
            .column(registered_product::Column::ProductName)
            .distinct()
            .order_by_asc(registered_product::Column::ProductName)
            .into_tuple::<String>()
            .all(&*self.db)
            .await?;
        Ok(names)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<registered_product::Model, ServiceError> {
        registered_product::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", id)))
    }

    /// Loads the given registrations, failing on the first unknown id.
    #[instrument(skip(self))]
    pub async fn get_many(
        &self,
        ids: &[Uuid],
    ) -> Result<Vec<registered_product::Model>, ServiceError> {
        let found = registered_product::Entity::find()
            .filter(registered_product::Column::Id.is_in(ids.iter().copied()))
            .all(&*self.db)
            .await?;

        ids.iter()
            .map(|id| {
                found
                    .iter()
                    .find(|p| p.id == *id)
                    .cloned()
                    .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", id)))
            })
            .collect()
    }

    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: Uuid,
        input: ProductInput,
    ) -> Result<registered_product::Model, ServiceError> {
        input.validate()?;

        let mut product = self.get(id).await?.into_active_model();
        product.product_name = Set(input.product_name.trim().to_string());
        product.sku_name = Set(normalize(input.sku_name));
        product.amazon_code = Set(normalize(input.amazon_code));
        product.rakuten_code = Set(normalize(input.rakuten_code));
        product.qoo10_code = Set(normalize(input.qoo10_code));
        product.updated_at = Set(Some(Utc::now()));

        let updated = product.update(&*self.db).await?;
        info!(product_id = %updated.id, "Product updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = registered_product::Entity::delete_by_id(id)
            .exec(&*self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Product {} not found", id)));
        }
        info!(product_id = %id, "Product deleted");
        Ok(())
    }
}
