//! In-app notifications: listing, unread counts and read receipts.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::access::scope_permitted;
use crate::repository::NotificationRepository;
use common::AppResult;
use domain::{
    Action, Listing, Notification, Outcome, RequestContext, ResourceQuery, Restriction, Scope,
};

#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn list_notifications(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
        query: ResourceQuery,
    ) -> AppResult<Outcome<Listing<Notification>>>;

    async fn count_unread(&self, ctx: &RequestContext, user_id: Uuid) -> AppResult<Outcome<u64>>;

    async fn show_notification(&self, ctx: &RequestContext, id: Uuid)
        -> AppResult<Outcome<Notification>>;

    /// Stamp `read_at`; already-read notifications are left as they are
    async fn mark_as_read(&self, ctx: &RequestContext, id: Uuid)
        -> AppResult<Outcome<Notification>>;

    async fn mark_all_as_read(&self, ctx: &RequestContext, user_id: Uuid)
        -> AppResult<Outcome<Notification>>;

    async fn delete_notification(&self, ctx: &RequestContext, id: Uuid)
        -> AppResult<Outcome<Notification>>;
}

pub struct NotificationManager {
    notifications: Arc<dyn NotificationRepository>,
}

impl NotificationManager {
    pub fn new(notifications: Arc<dyn NotificationRepository>) -> Self {
        Self { notifications }
    }
}

#[async_trait]
impl NotificationService for NotificationManager {
    async fn list_notifications(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
        query: ResourceQuery,
    ) -> AppResult<Outcome<Listing<Notification>>> {
        if !ctx.is_self_or_super_admin(user_id)
            || !scope_permitted(ctx, &query, Restriction::User(user_id))
        {
            return Ok(Outcome::forbidden::<Notification>(Action::Viewed));
        }

        let query = query.scoped_or(|| Scope::latest(Restriction::User(user_id)));
        Ok(Outcome::Found(self.notifications.list(&query).await?))
    }

    async fn count_unread(&self, ctx: &RequestContext, user_id: Uuid) -> AppResult<Outcome<u64>> {
        if !ctx.is_self_or_super_admin(user_id) {
            return Ok(Outcome::forbidden::<Notification>(Action::Viewed));
        }
        Ok(Outcome::Found(self.notifications.count_unread(user_id).await?))
    }

    async fn show_notification(
        &self,
        ctx: &RequestContext,
        id: Uuid,
    ) -> AppResult<Outcome<Notification>> {
        match self.notifications.find_by_id(id).await? {
            Some(notification) if ctx.is_self_or_super_admin(notification.user_id) => {
                Ok(Outcome::Found(notification))
            }
            Some(_) => Ok(Outcome::forbidden::<Notification>(Action::Viewed)),
            None => Ok(Outcome::not_found::<Notification>(None)),
        }
    }

    async fn mark_as_read(
        &self,
        ctx: &RequestContext,
        id: Uuid,
    ) -> AppResult<Outcome<Notification>> {
        let Some(notification) = self.notifications.find_by_id(id).await? else {
            return Ok(Outcome::not_found::<Notification>(Some(Action::MarkedAsRead)));
        };
        if !ctx.is_self_or_super_admin(notification.user_id) {
            warn!(notification_id = %id, "Mark as read refused");
            return Ok(Outcome::forbidden::<Notification>(Action::MarkedAsRead));
        }
        if notification.is_read() {
            return Ok(Outcome::done::<Notification>(Action::MarkedAsRead));
        }

        self.notifications.mark_as_read(id, Utc::now()).await?;
        Ok(Outcome::done::<Notification>(Action::MarkedAsRead))
    }

    async fn mark_all_as_read(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
    ) -> AppResult<Outcome<Notification>> {
        if !ctx.is_self_or_super_admin(user_id) {
            return Ok(Outcome::forbidden::<Notification>(Action::MarkedAsRead));
        }

        let updated = self.notifications.mark_all_as_read(user_id, Utc::now()).await?;
        info!(user_id = %user_id, updated, "Notifications marked as read");
        Ok(Outcome::Done {
            action: Action::MarkedAsRead,
            message: "Notifications marked as read".to_string(),
        })
    }

    async fn delete_notification(
        &self,
        ctx: &RequestContext,
        id: Uuid,
    ) -> AppResult<Outcome<Notification>> {
        let Some(notification) = self.notifications.find_by_id(id).await? else {
            return Ok(Outcome::not_found::<Notification>(Some(Action::Deleted)));
        };
        if !ctx.is_self_or_super_admin(notification.user_id) {
            return Ok(Outcome::forbidden::<Notification>(Action::Deleted));
        }

        self.notifications.delete(id).await?;
        Ok(Outcome::done::<Notification>(Action::Deleted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockNotificationRepository;
    use crate::service::test_support::{super_admin, user};
    use domain::RefusalReason;
    use serde_json::json;

    fn notification(user_id: Uuid, read: bool) -> Notification {
        Notification {
            id: Uuid::new_v4(),
            user_id,
            kind: "subscription created".to_string(),
            data: json!({ "subscription_id": Uuid::new_v4() }),
            read_at: read.then(Utc::now),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn marking_twice_writes_once() {
        let user_id = Uuid::new_v4();
        let unread = notification(user_id, false);
        let read = Notification {
            read_at: Some(Utc::now()),
            ..unread.clone()
        };
        let id = unread.id;

        let mut notifications = MockNotificationRepository::new();
        let mut seq = mockall::Sequence::new();
        notifications
            .expect_find_by_id()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| Ok(Some(unread.clone())));
        let marked = read.clone();
        notifications
            .expect_mark_as_read()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_, _| Ok(marked.clone()));
        notifications
            .expect_find_by_id()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| Ok(Some(read.clone())));

        let manager = NotificationManager::new(Arc::new(notifications));
        let first = manager.mark_as_read(&user(user_id), id).await.unwrap();
        let second = manager.mark_as_read(&user(user_id), id).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(second.message(), Some("Notification marked as read"));
    }

    #[tokio::test]
    async fn unread_count_is_private() {
        let outcome = NotificationManager::new(Arc::new(MockNotificationRepository::new()))
            .count_unread(&user(Uuid::new_v4()), Uuid::new_v4())
            .await
            .unwrap();

        assert_eq!(
            outcome.refusal().map(|r| r.reason),
            Some(RefusalReason::Forbidden)
        );
    }

    #[tokio::test]
    async fn super_admin_reads_any_unread_count() {
        let mut notifications = MockNotificationRepository::new();
        notifications.expect_count_unread().returning(|_| Ok(3));

        let outcome = NotificationManager::new(Arc::new(notifications))
            .count_unread(&super_admin(), Uuid::new_v4())
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Found(3));
    }

    #[tokio::test]
    async fn mark_all_reports_a_fixed_message() {
        let user_id = Uuid::new_v4();
        let mut notifications = MockNotificationRepository::new();
        notifications
            .expect_mark_all_as_read()
            .withf(move |id, _| *id == user_id)
            .returning(|_, _| Ok(0));

        let outcome = NotificationManager::new(Arc::new(notifications))
            .mark_all_as_read(&user(user_id), user_id)
            .await
            .unwrap();

        assert_eq!(outcome.message(), Some("Notifications marked as read"));
    }
}
