//! Store quota data access.
//!
//! Every store has at most one quota row, created on first access.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, Unchanged,
};
use uuid::Uuid;

use super::credits::{add_store_credits, ensure_store_quota, take_store_credit};
use super::entities::store_quota::{self, ActiveModel, Entity as StoreQuotaEntity};
use common::{AppError, AppResult};
use domain::{StoreQuota, UpdateStoreQuota};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait StoreQuotaRepository: Send + Sync {
    /// Fetch the quota, inserting the default one when missing
    async fn find_or_create(&self, store_id: Uuid) -> AppResult<StoreQuota>;

    async fn update(&self, store_id: Uuid, changes: UpdateStoreQuota) -> AppResult<StoreQuota>;

    async fn add_sms_credits(&self, store_id: Uuid, credits: i32) -> AppResult<StoreQuota>;

    /// Take one SMS credit; false when the store has none left
    async fn consume_sms_credit(&self, store_id: Uuid) -> AppResult<bool>;
}

pub struct StoreQuotaStore {
    db: DatabaseConnection,
}

impl StoreQuotaStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(&self, store_id: Uuid) -> AppResult<Option<store_quota::Model>> {
        let result = StoreQuotaEntity::find()
            .filter(store_quota::Column::StoreId.eq(store_id))
            .one(&self.db)
            .await?;
        Ok(result)
    }
}

#[async_trait]
impl StoreQuotaRepository for StoreQuotaStore {
    async fn find_or_create(&self, store_id: Uuid) -> AppResult<StoreQuota> {
        if let Some(model) = self.find_model(store_id).await? {
            return Ok(StoreQuota::from(model));
        }

        ensure_store_quota(&self.db, store_id).await?;
        tracing::info!(store_id = %store_id, "Store quota created");

        self.find_model(store_id)
            .await?
            .map(StoreQuota::from)
            .ok_or(AppError::NotFound)
    }

    async fn update(&self, store_id: Uuid, changes: UpdateStoreQuota) -> AppResult<StoreQuota> {
        let model = self.find_or_create(store_id).await?;

        let mut active = ActiveModel {
            id: Unchanged(model.id),
            updated_at: Set(chrono::Utc::now()),
            ..Default::default()
        };
        if let Some(sms_credits) = changes.sms_credits {
            active.sms_credits = Set(sms_credits);
        }
        if let Some(email_credits) = changes.email_credits {
            active.email_credits = Set(email_credits);
        }

        let model = active.update(&self.db).await?;
        Ok(StoreQuota::from(model))
    }

    async fn add_sms_credits(&self, store_id: Uuid, credits: i32) -> AppResult<StoreQuota> {
        ensure_store_quota(&self.db, store_id).await?;
        add_store_credits(&self.db, store_id, credits).await?;

        self.find_model(store_id)
            .await?
            .map(StoreQuota::from)
            .ok_or(AppError::NotFound)
    }

    async fn consume_sms_credit(&self, store_id: Uuid) -> AppResult<bool> {
        take_store_credit(&self.db, store_id).await
    }
}
