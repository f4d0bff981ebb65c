//! Store lookups used by the ownership tier of authorization.

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

use super::entities::{store, store_member};
use common::AppResult;
use domain::{Store, STORE_ROLE_ADMIN};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait StoreRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Store>>;

    /// True when the user created the store or is one of its admins
    async fn is_manager(&self, store_id: Uuid, user_id: Uuid) -> AppResult<bool>;
}

pub struct StoreLookup {
    db: DatabaseConnection,
}

impl StoreLookup {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl StoreRepository for StoreLookup {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Store>> {
        let result = store::Entity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Store::from))
    }

    async fn is_manager(&self, store_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let created = store::Entity::find_by_id(store_id)
            .filter(store::Column::UserId.eq(user_id))
            .count(&self.db)
            .await?;
        if created > 0 {
            return Ok(true);
        }

        let admins = store_member::Entity::find()
            .filter(store_member::Column::StoreId.eq(store_id))
            .filter(store_member::Column::UserId.eq(user_id))
            .filter(store_member::Column::Role.eq(STORE_ROLE_ADMIN))
            .count(&self.db)
            .await?;
        Ok(admins > 0)
    }
}
