//! Notification data access.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, Set,
};
use uuid::Uuid;

use super::base::{fetch_listing, scoped_select, ScopedEntity};
use super::entities::notification::{self, ActiveModel, Entity as NotificationEntity};
use common::{AppError, AppResult};
use domain::{Listing, NewNotification, Notification, ResourceQuery, Restriction};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

impl ScopedEntity for NotificationEntity {
    fn id_column() -> notification::Column {
        notification::Column::Id
    }

    fn created_at_column() -> notification::Column {
        notification::Column::CreatedAt
    }

    fn search_columns() -> Vec<notification::Column> {
        vec![notification::Column::Kind]
    }

    fn restrict(restriction: &Restriction) -> Option<Condition> {
        match restriction {
            Restriction::Everything => Some(Condition::all()),
            Restriction::User(user_id) => {
                Some(Condition::all().add(notification::Column::UserId.eq(*user_id)))
            }
            Restriction::Store(_) | Restriction::Owner(_) => None,
        }
    }
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn list(&self, query: &ResourceQuery) -> AppResult<Listing<Notification>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Notification>>;

    async fn count_unread(&self, user_id: Uuid) -> AppResult<u64>;

    async fn insert(&self, notification: NewNotification) -> AppResult<Notification>;

    /// Set `read_at` unless it is already set; returns the stored row
    async fn mark_as_read(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<Notification>;

    /// Mark every unread notification of the user; returns how many changed
    async fn mark_all_as_read(&self, user_id: Uuid, at: DateTime<Utc>) -> AppResult<u64>;

    async fn delete(&self, id: Uuid) -> AppResult<u64>;
}

pub struct NotificationStore {
    db: DatabaseConnection,
}

impl NotificationStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl NotificationRepository for NotificationStore {
    async fn list(&self, query: &ResourceQuery) -> AppResult<Listing<Notification>> {
        let select = scoped_select::<NotificationEntity>(query)?;
        let listing = fetch_listing(&self.db, select, query).await?;
        Ok(listing.map(Notification::from))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Notification>> {
        let result = NotificationEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Notification::from))
    }

    async fn count_unread(&self, user_id: Uuid) -> AppResult<u64> {
        let total = NotificationEntity::find()
            .filter(notification::Column::UserId.eq(user_id))
            .filter(notification::Column::ReadAt.is_null())
            .count(&self.db)
            .await?;
        Ok(total)
    }

    async fn insert(&self, notification: NewNotification) -> AppResult<Notification> {
        let now = Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(notification.user_id),
            kind: Set(notification.kind),
            data: Set(notification.data),
            read_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await?;
        Ok(Notification::from(model))
    }

    async fn mark_as_read(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<Notification> {
        NotificationEntity::update_many()
            .col_expr(notification::Column::ReadAt, Expr::value(Some(at)))
            .col_expr(notification::Column::UpdatedAt, Expr::value(at))
            .filter(notification::Column::Id.eq(id))
            .filter(notification::Column::ReadAt.is_null())
            .exec(&self.db)
            .await?;

        NotificationEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Notification::from)
            .ok_or(AppError::NotFound)
    }

    async fn mark_all_as_read(&self, user_id: Uuid, at: DateTime<Utc>) -> AppResult<u64> {
        let result = NotificationEntity::update_many()
            .col_expr(notification::Column::ReadAt, Expr::value(Some(at)))
            .col_expr(notification::Column::UpdatedAt, Expr::value(at))
            .filter(notification::Column::UserId.eq(user_id))
            .filter(notification::Column::ReadAt.is_null())
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }

    async fn delete(&self, id: Uuid) -> AppResult<u64> {
        let result = NotificationEntity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected)
    }
}
