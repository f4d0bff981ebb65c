//! Per-store SMS and email credit balances.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::access::manages_store;
use crate::repository::{StoreQuotaRepository, StoreRepository};
use common::{AppError, AppResult};
use domain::{
    validate_input, Action, Outcome, RequestContext, Store, StoreQuota, UpdateStoreQuota,
};

#[async_trait]
pub trait StoreQuotaService: Send + Sync {
    /// The store's quota, created with default balances on first access
    async fn show_quota(&self, ctx: &RequestContext, store_id: Uuid)
        -> AppResult<Outcome<StoreQuota>>;

    async fn update_quota(
        &self,
        ctx: &RequestContext,
        store_id: Uuid,
        changes: UpdateStoreQuota,
    ) -> AppResult<Outcome<StoreQuota>>;

    /// Top up SMS credits; super admins only
    async fn add_sms_credits(
        &self,
        ctx: &RequestContext,
        store_id: Uuid,
        credits: i32,
    ) -> AppResult<Outcome<StoreQuota>>;

    /// Spend one SMS credit, failing with a bad request when none are left
    async fn consume_sms_credit(&self, ctx: &RequestContext, store_id: Uuid)
        -> AppResult<Outcome<StoreQuota>>;
}

pub struct StoreQuotaManager {
    quotas: Arc<dyn StoreQuotaRepository>,
    stores: Arc<dyn StoreRepository>,
}

impl StoreQuotaManager {
    pub fn new(quotas: Arc<dyn StoreQuotaRepository>, stores: Arc<dyn StoreRepository>) -> Self {
        Self { quotas, stores }
    }

    async fn store_exists(&self, store_id: Uuid) -> AppResult<bool> {
        Ok(self.stores.find_by_id(store_id).await?.is_some())
    }
}

#[async_trait]
impl StoreQuotaService for StoreQuotaManager {
    async fn show_quota(
        &self,
        ctx: &RequestContext,
        store_id: Uuid,
    ) -> AppResult<Outcome<StoreQuota>> {
        if !self.store_exists(store_id).await? {
            return Ok(Outcome::not_found::<Store>(None));
        }
        if !manages_store(ctx, self.stores.as_ref(), store_id).await? {
            return Ok(Outcome::forbidden::<StoreQuota>(Action::Viewed));
        }
        Ok(Outcome::Found(self.quotas.find_or_create(store_id).await?))
    }

    async fn update_quota(
        &self,
        ctx: &RequestContext,
        store_id: Uuid,
        changes: UpdateStoreQuota,
    ) -> AppResult<Outcome<StoreQuota>> {
        if !self.store_exists(store_id).await? {
            return Ok(Outcome::not_found::<Store>(Some(Action::Updated)));
        }
        if !manages_store(ctx, self.stores.as_ref(), store_id).await? {
            warn!(store_id = %store_id, "Store quota update refused");
            return Ok(Outcome::forbidden::<StoreQuota>(Action::Updated));
        }
        validate_input(&changes)?;

        let quota = self.quotas.update(store_id, changes).await?;
        info!(store_id = %store_id, "Store quota updated");
        Ok(Outcome::show_updated(quota))
    }

    async fn add_sms_credits(
        &self,
        ctx: &RequestContext,
        store_id: Uuid,
        credits: i32,
    ) -> AppResult<Outcome<StoreQuota>> {
        if !ctx.is_super_admin() {
            return Ok(Outcome::forbidden::<StoreQuota>(Action::Updated));
        }
        if credits <= 0 {
            return Err(AppError::validation("SMS credits to add must be positive"));
        }
        if !self.store_exists(store_id).await? {
            return Ok(Outcome::not_found::<Store>(Some(Action::Updated)));
        }

        let quota = self.quotas.add_sms_credits(store_id, credits).await?;
        info!(store_id = %store_id, credits, balance = quota.sms_credits, "SMS credits added");
        Ok(Outcome::show_updated(quota))
    }

    async fn consume_sms_credit(
        &self,
        ctx: &RequestContext,
        store_id: Uuid,
    ) -> AppResult<Outcome<StoreQuota>> {
        if !self.store_exists(store_id).await? {
            return Ok(Outcome::not_found::<Store>(Some(Action::Updated)));
        }
        if !manages_store(ctx, self.stores.as_ref(), store_id).await? {
            return Ok(Outcome::forbidden::<StoreQuota>(Action::Updated));
        }
        if !self.quotas.consume_sms_credit(store_id).await? {
            return Err(AppError::BadRequest(
                "The store has no SMS credits left".to_string(),
            ));
        }

        Ok(Outcome::show_updated(self.quotas.find_or_create(store_id).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{MockStoreQuotaRepository, MockStoreRepository};
    use crate::service::test_support::{store, super_admin, user};
    use chrono::Utc;

    fn quota(store_id: Uuid, sms_credits: i32) -> StoreQuota {
        StoreQuota {
            id: Uuid::new_v4(),
            store_id,
            sms_credits,
            email_credits: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn stores_with(shop: Store, manager: bool) -> MockStoreRepository {
        let mut stores = MockStoreRepository::new();
        stores
            .expect_find_by_id()
            .returning(move |_| Ok(Some(shop.clone())));
        stores.expect_is_manager().returning(move |_, _| Ok(manager));
        stores
    }

    #[tokio::test]
    async fn quota_is_created_on_first_view() {
        let owner_id = Uuid::new_v4();
        let shop = store(owner_id);
        let store_id = shop.id;

        let mut quotas = MockStoreQuotaRepository::new();
        quotas
            .expect_find_or_create()
            .times(1)
            .returning(|store_id| Ok(quota(store_id, 0)));

        let outcome = StoreQuotaManager::new(Arc::new(quotas), Arc::new(stores_with(shop, true)))
            .show_quota(&user(owner_id), store_id)
            .await
            .unwrap();

        assert_eq!(outcome.resource().map(|q| q.store_id), Some(store_id));
    }

    #[tokio::test]
    async fn only_super_admin_tops_up() {
        let shop = store(Uuid::new_v4());
        let outcome = StoreQuotaManager::new(
            Arc::new(MockStoreQuotaRepository::new()),
            Arc::new(stores_with(shop.clone(), true)),
        )
        .add_sms_credits(&user(shop.user_id), shop.id, 10)
        .await
        .unwrap();

        assert!(outcome.is_refused());
    }

    #[tokio::test]
    async fn top_up_adds_to_balance() {
        let shop = store(Uuid::new_v4());
        let store_id = shop.id;

        let mut quotas = MockStoreQuotaRepository::new();
        quotas
            .expect_add_sms_credits()
            .withf(move |id, credits| *id == store_id && *credits == 25)
            .returning(|store_id, credits| Ok(quota(store_id, 5 + credits)));

        let outcome = StoreQuotaManager::new(Arc::new(quotas), Arc::new(stores_with(shop, false)))
            .add_sms_credits(&super_admin(), store_id, 25)
            .await
            .unwrap();

        assert_eq!(outcome.resource().map(|q| q.sms_credits), Some(30));
    }

    #[tokio::test]
    async fn empty_balance_is_a_bad_request() {
        let shop = store(Uuid::new_v4());
        let store_id = shop.id;

        let mut quotas = MockStoreQuotaRepository::new();
        quotas.expect_consume_sms_credit().returning(|_| Ok(false));

        let result = StoreQuotaManager::new(Arc::new(quotas), Arc::new(stores_with(shop, true)))
            .consume_sms_credit(&super_admin(), store_id)
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
