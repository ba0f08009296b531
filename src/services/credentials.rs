use chrono::Utc;
use sea_orm::{sea_query::OnConflict, DatabaseConnection, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;

use crate::entities::setting;
use crate::errors::ServiceError;

pub const MALL_CREDENTIALS_KEY: &str = "mall_credentials";

/// Login fields for one marketplace seller account.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MarketplaceLogin {
    pub login_id: String,
    pub password: String,
    pub api_key: String,
}

impl std::fmt::Debug for MarketplaceLogin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketplaceLogin")
            .field("login_id", &self.login_id)
            .field("password", &"***")
            .field("api_key", &"***")
            .finish()
    }
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AdPlatformKey {
    pub api_key: String,
}

impl std::fmt::Debug for AdPlatformKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdPlatformKey")
            .field("api_key", &"***")
            .finish()
    }
}

/// The whole credentials document, read and written as one unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MallCredentials {
    pub amazon: MarketplaceLogin,
    pub rakuten: MarketplaceLogin,
    pub qoo10: MarketplaceLogin,
    pub x: AdPlatformKey,
    pub tiktok: AdPlatformKey,
}

/// Single-document settings store for marketplace credentials.
#[derive(Clone)]
pub struct CredentialService {
    db: Arc<DatabaseConnection>,
}

impl CredentialService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Returns the saved document, or an empty one when nothing was saved yet.
    #[instrument(skip(self))]
    pub async fn get(&self) -> Result<MallCredentials, ServiceError> {
        let Some(row) = setting::Entity::find_by_id(MALL_CREDENTIALS_KEY.to_string())
            .one(&*self.db)
            .await?
        else {
            return Ok(MallCredentials::default());
        };

        serde_json::from_str(&row.value).map_err(|e| {
            error!(error = %e, "Stored credentials document is corrupt");
            ServiceError::SerializationError(format!(
                "Stored {} document could not be decoded: {}",
                MALL_CREDENTIALS_KEY, e
            ))
        })
    }

    /// Overwrites the stored document wholesale.
    #[instrument(skip(self, credentials))]
    pub async fn save(&self, credentials: MallCredentials) -> Result<MallCredentials, ServiceError> {
        let value = serde_json::to_string(&credentials)?;

        let row = setting::ActiveModel {
            key: Set(MALL_CREDENTIALS_KEY.to_string()),
            value: Set(value),
            updated_at: Set(Utc::now()),
        };
        setting::Entity::insert(row)
            .on_conflict(
                OnConflict::column(setting::Column::Key)
                    .update_columns([setting::Column::Value, setting::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec(&*self.db)
            .await?;

        info!("Mall credentials saved");
        Ok(credentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::test_db;
    use sea_orm::ActiveModelTrait;

    fn sample() -> MallCredentials {
        MallCredentials {
            amazon: MarketplaceLogin {
                login_id: "seller@example.com".into(),
                password: "hunter2".into(),
                api_key: String::new(),
            },
            tiktok: AdPlatformKey {
                api_key: "tt-key".into(),
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn empty_store_returns_empty_document() {
        let (_dir, db) = test_db().await;
        let service = CredentialService::new(db);
        assert_eq!(service.get().await.unwrap(), MallCredentials::default());
    }

    #[tokio::test]
    async fn save_overwrites_wholesale() {
        let (_dir, db) = test_db().await;
        let service = CredentialService::new(db);

        service.save(sample()).await.unwrap();
        assert_eq!(service.get().await.unwrap(), sample());

        let replacement = MallCredentials {
            x: AdPlatformKey {
                api_key: "x-key".into(),
            },
            ..Default::default()
        };
        service.save(replacement.clone()).await.unwrap();
        assert_eq!(service.get().await.unwrap(), replacement);
    }

    #[tokio::test]
    async fn corrupt_document_is_an_error() {
        let (_dir, db) = test_db().await;
        setting::ActiveModel {
            key: Set(MALL_CREDENTIALS_KEY.to_string()),
            value: Set("{\"amazon\": 42".to_string()),
            updated_at: Set(Utc::now()),
        }
        .insert(&*db)
        .await
        .unwrap();

        let service = CredentialService::new(db);
        assert!(matches!(
            service.get().await,
            Err(ServiceError::SerializationError(_))
        ));
    }

    #[test]
    fn debug_output_masks_secrets() {
        let rendered = format!("{:?}", sample());
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("tt-key"));
        assert!(rendered.contains("seller@example.com"));
    }
}
