//! Out-of-band user notifications.

use std::sync::Arc;

use async_trait::async_trait;

use crate::repository::NotificationRepository;
use common::AppResult;
use domain::NewNotification;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: NewNotification) -> AppResult<()>;
}

/// Delivers notifications by storing them in the user's inbox.
pub struct DatabaseNotifier {
    notifications: Arc<dyn NotificationRepository>,
}

impl DatabaseNotifier {
    pub fn new(notifications: Arc<dyn NotificationRepository>) -> Self {
        Self { notifications }
    }
}

#[async_trait]
impl Notifier for DatabaseNotifier {
    async fn notify(&self, notification: NewNotification) -> AppResult<()> {
        let stored = self.notifications.insert(notification).await?;
        tracing::info!(
            notification_id = %stored.id,
            user_id = %stored.user_id,
            kind = %stored.kind,
            "Notification stored"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockNotificationRepository;
    use chrono::Utc;
    use domain::{Notification, NOTIFICATION_SUBSCRIPTION_CREATED};
    use uuid::Uuid;

    #[tokio::test]
    async fn notification_is_written_to_the_inbox() {
        let user_id = Uuid::new_v4();

        let mut repo = MockNotificationRepository::new();
        repo.expect_insert()
            .withf(move |n| n.user_id == user_id && n.kind == NOTIFICATION_SUBSCRIPTION_CREATED)
            .times(1)
            .returning(|n| {
                Ok(Notification {
                    id: Uuid::new_v4(),
                    user_id: n.user_id,
                    kind: n.kind,
                    data: n.data,
                    read_at: None,
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                })
            });

        let notifier = DatabaseNotifier::new(Arc::new(repo));
        let result = notifier
            .notify(NewNotification {
                user_id,
                kind: NOTIFICATION_SUBSCRIPTION_CREATED.to_string(),
                data: serde_json::json!({}),
            })
            .await;

        assert!(result.is_ok());
    }
}
