//! Friend data access.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use super::base::{delete_within, fetch_listing, scoped_select, ScopedEntity};
use super::entities::friend::{self, ActiveModel, Entity as FriendEntity};
use common::{AppError, AppResult};
use domain::{CreateFriend, Friend, Listing, ResourceQuery, Restriction, UpdateFriend};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

impl ScopedEntity for FriendEntity {
    fn id_column() -> friend::Column {
        friend::Column::Id
    }

    fn created_at_column() -> friend::Column {
        friend::Column::CreatedAt
    }

    fn search_columns() -> Vec<friend::Column> {
        vec![friend::Column::Name, friend::Column::MobileNumber]
    }

    fn restrict(restriction: &Restriction) -> Option<Condition> {
        match restriction {
            Restriction::Everything => Some(Condition::all()),
            Restriction::User(user_id) => {
                Some(Condition::all().add(friend::Column::UserId.eq(*user_id)))
            }
            Restriction::Store(_) | Restriction::Owner(_) => None,
        }
    }
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait FriendRepository: Send + Sync {
    async fn list(&self, query: &ResourceQuery) -> AppResult<Listing<Friend>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Friend>>;

    async fn create(&self, user_id: Uuid, input: CreateFriend) -> AppResult<Friend>;

    async fn update(&self, id: Uuid, changes: UpdateFriend) -> AppResult<Friend>;

    async fn delete_many(&self, ids: Vec<Uuid>, restriction: Restriction) -> AppResult<u64>;

    /// Record that the user picked this friend (e.g. as an order recipient)
    async fn mark_last_selected(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<Friend>;
}

pub struct FriendStore {
    db: DatabaseConnection,
}

impl FriendStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(&self, id: Uuid) -> AppResult<friend::Model> {
        FriendEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }
}

#[async_trait]
impl FriendRepository for FriendStore {
    async fn list(&self, query: &ResourceQuery) -> AppResult<Listing<Friend>> {
        let select = scoped_select::<FriendEntity>(query)?;
        let listing = fetch_listing(&self.db, select, query).await?;
        Ok(listing.map(Friend::from))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Friend>> {
        let result = FriendEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Friend::from))
    }

    async fn create(&self, user_id: Uuid, input: CreateFriend) -> AppResult<Friend> {
        let now = Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            name: Set(input.name),
            mobile_number: Set(input.mobile_number),
            last_selected_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await?;
        Ok(Friend::from(model))
    }

    async fn update(&self, id: Uuid, changes: UpdateFriend) -> AppResult<Friend> {
        let mut active: ActiveModel = self.find_model(id).await?.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(mobile_number) = changes.mobile_number {
            active.mobile_number = Set(mobile_number);
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(&self.db).await?;
        Ok(Friend::from(model))
    }

    async fn delete_many(&self, ids: Vec<Uuid>, restriction: Restriction) -> AppResult<u64> {
        delete_within::<_, FriendEntity>(&self.db, &ids, &restriction).await
    }

    async fn mark_last_selected(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<Friend> {
        let mut active: ActiveModel = self.find_model(id).await?.into();
        active.last_selected_at = Set(Some(at));
        active.updated_at = Set(at);

        let model = active.update(&self.db).await?;
        Ok(Friend::from(model))
    }
}
