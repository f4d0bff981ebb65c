//! Outbound SMS: stored first, paid for with a store credit, then queued.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::access::{manages_store, scope_permitted};
use super::views::WithStore;
use crate::integrations::SmsQueue;
use crate::jobs::SmsJob;
use crate::repository::{SmsMessageRepository, StoreRepository};
use common::{AppError, AppResult};
use domain::{
    ensure_mobile_number, validate_input, Action, CreateSmsMessage, Includes, Listing, Outcome,
    RequestContext, ResourceQuery, Restriction, Scope, SmsMessage, Store,
};

#[async_trait]
pub trait SmsMessageService: Send + Sync {
    /// Messages of one store, or of the whole platform when `store_id` is `None`
    async fn list_messages(
        &self,
        ctx: &RequestContext,
        store_id: Option<Uuid>,
        query: ResourceQuery,
    ) -> AppResult<Outcome<Listing<WithStore<SmsMessage>>>>;

    async fn show_message(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        includes: &Includes,
    ) -> AppResult<Outcome<WithStore<SmsMessage>>>;

    /// Charge one credit, store the message and queue it for delivery
    async fn send_message(
        &self,
        ctx: &RequestContext,
        store_id: Uuid,
        input: CreateSmsMessage,
    ) -> AppResult<Outcome<SmsMessage>>;
}

pub struct SmsMessageManager {
    messages: Arc<dyn SmsMessageRepository>,
    stores: Arc<dyn StoreRepository>,
    queue: Arc<dyn SmsQueue>,
}

impl SmsMessageManager {
    pub fn new(
        messages: Arc<dyn SmsMessageRepository>,
        stores: Arc<dyn StoreRepository>,
        queue: Arc<dyn SmsQueue>,
    ) -> Self {
        Self {
            messages,
            stores,
            queue,
        }
    }
}

#[async_trait]
impl SmsMessageService for SmsMessageManager {
    async fn list_messages(
        &self,
        ctx: &RequestContext,
        store_id: Option<Uuid>,
        query: ResourceQuery,
    ) -> AppResult<Outcome<Listing<WithStore<SmsMessage>>>> {
        let (store, default) = match store_id {
            Some(store_id) => {
                let Some(store) = self.stores.find_by_id(store_id).await? else {
                    return Ok(Outcome::not_found::<Store>(None));
                };
                if !manages_store(ctx, self.stores.as_ref(), store_id).await?
                    || !scope_permitted(ctx, &query, Restriction::Store(store_id))
                {
                    return Ok(Outcome::forbidden::<SmsMessage>(Action::Viewed));
                }
                (Some(store), Restriction::Store(store_id))
            }
            None if ctx.is_super_admin() => (None, Restriction::Everything),
            None => return Ok(Outcome::forbidden::<SmsMessage>(Action::Viewed)),
        };

        let query = query.scoped_or(|| Scope::latest(default));
        let messages = self.messages.list(&query).await?;

        let attached = store.filter(|_| query.includes.wants("store"));
        Ok(Outcome::Found(messages.map(|message| WithStore {
            resource: message,
            store: attached.clone(),
        })))
    }

    async fn show_message(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        includes: &Includes,
    ) -> AppResult<Outcome<WithStore<SmsMessage>>> {
        let Some(message) = self.messages.find_by_id(id).await? else {
            return Ok(Outcome::not_found::<SmsMessage>(None));
        };
        let permitted = match message.store_id {
            Some(store_id) => manages_store(ctx, self.stores.as_ref(), store_id).await?,
            None => ctx.is_super_admin(),
        };
        if !permitted {
            return Ok(Outcome::forbidden::<SmsMessage>(Action::Viewed));
        }

        let store = match (message.store_id, includes.wants("store")) {
            (Some(store_id), true) => self.stores.find_by_id(store_id).await?,
            _ => None,
        };
        Ok(Outcome::Found(WithStore {
            resource: message,
            store,
        }))
    }

    async fn send_message(
        &self,
        ctx: &RequestContext,
        store_id: Uuid,
        input: CreateSmsMessage,
    ) -> AppResult<Outcome<SmsMessage>> {
        if self.stores.find_by_id(store_id).await?.is_none() {
            return Ok(Outcome::not_found::<Store>(Some(Action::Created)));
        }
        if !manages_store(ctx, self.stores.as_ref(), store_id).await? {
            warn!(store_id = %store_id, "SMS send refused");
            return Ok(Outcome::forbidden::<SmsMessage>(Action::Created));
        }
        validate_input(&input)?;
        ensure_mobile_number(&input.recipient_mobile_number)?;

        let Some(message) = self.messages.create_paid(store_id, input).await? else {
            return Err(AppError::BadRequest(
                "The store has no SMS credits left".to_string(),
            ));
        };
        let job = SmsJob::new(
            message.id,
            message.recipient_mobile_number.clone(),
            message.content.clone(),
        );

        if let Err(e) = self.queue.dispatch(job).await {
            error!(
                sms_message_id = %message.id,
                error = %e,
                "SMS dispatch failed, refunding credit"
            );
            let reason = e.to_string();
            if let Err(refund) = self.messages.cancel_paid(message.id, store_id, reason).await {
                error!(sms_message_id = %message.id, error = %refund, "SMS refund failed");
            }
            return Err(e);
        }

        info!(sms_message_id = %message.id, store_id = %store_id, "SMS queued");
        Ok(Outcome::show_created(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrations::MockSmsQueue;
    use crate::repository::{MockSmsMessageRepository, MockStoreRepository};
    use crate::service::test_support::{store, super_admin, user};
    use chrono::Utc;
    use domain::RefusalReason;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn message(store_id: Uuid, input: &CreateSmsMessage) -> SmsMessage {
        SmsMessage {
            id: Uuid::new_v4(),
            store_id: Some(store_id),
            recipient_mobile_number: input.recipient_mobile_number.clone(),
            content: input.content.clone(),
            sent: false,
            error: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn input() -> CreateSmsMessage {
        CreateSmsMessage {
            recipient_mobile_number: "+26772000001".to_string(),
            content: "Your order is ready".to_string(),
        }
    }

    fn managed_store() -> (Store, MockStoreRepository) {
        let shop = store(Uuid::new_v4());
        let found = shop.clone();
        let mut stores = MockStoreRepository::new();
        stores
            .expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        stores.expect_is_manager().returning(|_, _| Ok(true));
        (shop, stores)
    }

    fn manager(
        messages: MockSmsMessageRepository,
        stores: MockStoreRepository,
        queue: MockSmsQueue,
    ) -> SmsMessageManager {
        SmsMessageManager::new(Arc::new(messages), Arc::new(stores), Arc::new(queue))
    }

    #[tokio::test]
    async fn send_charges_stores_and_queues() {
        let (shop, stores) = managed_store();
        let store_id = shop.id;

        let mut messages = MockSmsMessageRepository::new();
        messages
            .expect_create_paid()
            .times(1)
            .returning(|store_id, input| Ok(Some(message(store_id, &input))));
        let mut queue = MockSmsQueue::new();
        queue
            .expect_dispatch()
            .withf(|job| job.content == "Your order is ready")
            .times(1)
            .returning(|_| Ok(()));

        let outcome = manager(messages, stores, queue)
            .send_message(&user(shop.user_id), store_id, input())
            .await
            .unwrap();

        assert_eq!(outcome.message(), Some("SMS message created"));
        assert_eq!(outcome.resource().and_then(|m| m.store_id), Some(store_id));
    }

    #[tokio::test]
    async fn failed_dispatch_cancels_the_paid_message() {
        let (shop, stores) = managed_store();
        let store_id = shop.id;

        let mut messages = MockSmsMessageRepository::new();
        messages
            .expect_create_paid()
            .returning(|store_id, input| Ok(Some(message(store_id, &input))));
        messages
            .expect_cancel_paid()
            .withf(move |_, id, reason| *id == store_id && reason.contains("connection refused"))
            .times(1)
            .returning(|_, _, _| Ok(()));
        let mut queue = MockSmsQueue::new();
        queue
            .expect_dispatch()
            .returning(|_| Err(AppError::queue("connection refused")));

        let result = manager(messages, stores, queue)
            .send_message(&super_admin(), store_id, input())
            .await;

        assert!(matches!(result, Err(AppError::Queue(_))));
    }

    #[tokio::test]
    async fn failed_refund_keeps_the_dispatch_error() {
        let (shop, stores) = managed_store();

        let mut messages = MockSmsMessageRepository::new();
        messages
            .expect_create_paid()
            .returning(|store_id, input| Ok(Some(message(store_id, &input))));
        messages
            .expect_cancel_paid()
            .times(1)
            .returning(|_, _, _| Err(AppError::internal("pool closed")));
        let mut queue = MockSmsQueue::new();
        queue
            .expect_dispatch()
            .returning(|_| Err(AppError::queue("connection refused")));

        let result = manager(messages, stores, queue)
            .send_message(&super_admin(), shop.id, input())
            .await;

        assert!(matches!(result, Err(AppError::Queue(_))));
    }

    #[tokio::test]
    async fn failed_insert_queues_nothing() {
        let (shop, stores) = managed_store();
        let dispatched = Arc::new(AtomicUsize::new(0));

        let mut messages = MockSmsMessageRepository::new();
        messages
            .expect_create_paid()
            .times(1)
            .returning(|_, _| Err(AppError::internal("insert failed")));
        let mut queue = MockSmsQueue::new();
        let counter = dispatched.clone();
        queue.expect_dispatch().returning(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let result = manager(messages, stores, queue)
            .send_message(&super_admin(), shop.id, input())
            .await;

        assert!(result.is_err());
        assert_eq!(dispatched.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn no_credits_means_nothing_is_queued() {
        let (shop, stores) = managed_store();

        let mut messages = MockSmsMessageRepository::new();
        messages.expect_create_paid().returning(|_, _| Ok(None));

        let result = manager(messages, stores, MockSmsQueue::new())
            .send_message(&super_admin(), shop.id, input())
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn platform_listing_needs_super_admin() {
        let outcome = manager(
            MockSmsMessageRepository::new(),
            MockStoreRepository::new(),
            MockSmsQueue::new(),
        )
        .list_messages(&user(Uuid::new_v4()), None, ResourceQuery::new())
        .await
        .unwrap();

        assert_eq!(
            outcome.refusal().map(|r| r.reason),
            Some(RefusalReason::Forbidden)
        );
    }

    #[tokio::test]
    async fn platform_listing_defaults_to_everything() {
        let mut messages = MockSmsMessageRepository::new();
        messages
            .expect_list()
            .withf(|query| query.scope() == Some(&Scope::latest(Restriction::Everything)))
            .times(1)
            .returning(|_| Ok(Listing::Count { total: 12 }));

        let outcome = manager(messages, MockStoreRepository::new(), MockSmsQueue::new())
            .list_messages(&super_admin(), None, ResourceQuery::new().counting())
            .await
            .unwrap();

        assert_eq!(outcome.into_resource().map(|l| l.total()), Some(12));
    }
}
