use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::entities::event_flag;
use crate::errors::ServiceError;
use crate::models::DateRange;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FlagInput {
    #[validate(
        length(min = 1, max = 255, message = "Flag name is required"),
        custom = "crate::models::not_blank"
    )]
    pub name: String,
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: String,
}

/// Registry of event flags plotted on the sales timeline.
#[derive(Clone)]
pub struct FlagService {
    db: Arc<DatabaseConnection>,
}

impl FlagService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn create(&self, input: FlagInput) -> Result<event_flag::Model, ServiceError> {
        input.validate()?;

        let flag = event_flag::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name.trim().to_string()),
            date: Set(input.date),
            description: Set(input.description),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(&*self.db)
        .await?;

        info!(flag_id = %flag.id, date = %flag.date, "Event flag created");
        Ok(flag)
    }

    /// Flags sorted by date descending; same-day flags keep creation order.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        range: Option<DateRange>,
    ) -> Result<Vec<event_flag::Model>, ServiceError> {
        let mut query = event_flag::Entity::find();
        if let Some(range) = range {
            query = query
                .filter(event_flag::Column::Date.gte(range.start_date))
                .filter(event_flag::Column::Date.lte(range.end_date));
        }

        let mut flags = query
            .order_by_asc(event_flag::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        // stable sort keeps the created_at order within a date
        flags.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(flags)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<event_flag::Model, ServiceError> {
        event_flag::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Flag {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: Uuid,
        input: FlagInput,
    ) -> Result<event_flag::Model, ServiceError> {
        input.validate()?;

        let mut flag = self.get(id).await?.into_active_model();
        flag.name = Set(input.name.trim().to_string());
        flag.date = Set(input.date);
        flag.description = Set(input.description);
        flag.updated_at = Set(Some(Utc::now()));

        let updated = flag.update(&*self.db).await?;
        info!(flag_id = %updated.id, "Event flag updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = event_flag::Entity::delete_by_id(id)
            .exec(&*self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Flag {} not found", id)));
        }
        info!(flag_id = %id, "Event flag deleted");
        Ok(())
    }
}
