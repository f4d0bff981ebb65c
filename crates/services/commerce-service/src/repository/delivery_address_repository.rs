//! Delivery address data access.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use super::base::{delete_within, fetch_listing, scoped_select, ScopedEntity};
use super::entities::delivery_address::{self, ActiveModel, Entity as DeliveryAddressEntity};
use common::{AppError, AppResult};
use domain::{
    CreateDeliveryAddress, DeliveryAddress, Listing, ResourceQuery, Restriction,
    UpdateDeliveryAddress,
};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

impl ScopedEntity for DeliveryAddressEntity {
    fn id_column() -> delivery_address::Column {
        delivery_address::Column::Id
    }

    fn created_at_column() -> delivery_address::Column {
        delivery_address::Column::CreatedAt
    }

    fn search_columns() -> Vec<delivery_address::Column> {
        vec![
            delivery_address::Column::Name,
            delivery_address::Column::AddressLine,
        ]
    }

    fn restrict(restriction: &Restriction) -> Option<Condition> {
        match restriction {
            Restriction::Everything => Some(Condition::all()),
            Restriction::User(user_id) => {
                Some(Condition::all().add(delivery_address::Column::UserId.eq(*user_id)))
            }
            Restriction::Store(_) | Restriction::Owner(_) => None,
        }
    }
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait DeliveryAddressRepository: Send + Sync {
    async fn list(&self, query: &ResourceQuery) -> AppResult<Listing<DeliveryAddress>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<DeliveryAddress>>;

    async fn create(&self, user_id: Uuid, input: CreateDeliveryAddress)
        -> AppResult<DeliveryAddress>;

    async fn update(&self, id: Uuid, changes: UpdateDeliveryAddress)
        -> AppResult<DeliveryAddress>;

    async fn delete(&self, id: Uuid) -> AppResult<u64>;

    async fn delete_many(&self, ids: Vec<Uuid>, restriction: Restriction) -> AppResult<u64>;
}

pub struct DeliveryAddressStore {
    db: DatabaseConnection,
}

impl DeliveryAddressStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DeliveryAddressRepository for DeliveryAddressStore {
    async fn list(&self, query: &ResourceQuery) -> AppResult<Listing<DeliveryAddress>> {
        let select = scoped_select::<DeliveryAddressEntity>(query)?;
        let listing = fetch_listing(&self.db, select, query).await?;
        Ok(listing.map(DeliveryAddress::from))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<DeliveryAddress>> {
        let result = DeliveryAddressEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(DeliveryAddress::from))
    }

    async fn create(
        &self,
        user_id: Uuid,
        input: CreateDeliveryAddress,
    ) -> AppResult<DeliveryAddress> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            name: Set(input.name),
            address_line: Set(input.address_line),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await?;
        Ok(DeliveryAddress::from(model))
    }

    async fn update(
        &self,
        id: Uuid,
        changes: UpdateDeliveryAddress,
    ) -> AppResult<DeliveryAddress> {
        let address = DeliveryAddressEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = address.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(address_line) = changes.address_line {
            active.address_line = Set(address_line);
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await?;
        Ok(DeliveryAddress::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<u64> {
        let result = DeliveryAddressEntity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected)
    }

    async fn delete_many(&self, ids: Vec<Uuid>, restriction: Restriction) -> AppResult<u64> {
        delete_within::<_, DeliveryAddressEntity>(&self.db, &ids, &restriction).await
    }
}
