//! Subscriptions: plan validation, back-to-back chaining, SMS credit grants
//! and the "subscription created" notification.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::access::{controls_owner, owner_not_found, scope_permitted};
use super::views::SubscriptionView;
use crate::integrations::Notifier;
use crate::repository::{OwnerRepository, StoreRepository, SubscriptionRepository};
use common::{AppError, AppResult};
use domain::{
    Action, CreateSubscription, Includes, Listing, NewNotification, NewSubscription, OwnerRef,
    Outcome, PlanKind, RequestContext, ResourceQuery, Restriction, Scope, Subscription,
    SubscriptionPlan, NOTIFICATION_SUBSCRIPTION_CREATED,
};

#[async_trait]
pub trait SubscriptionService: Send + Sync {
    /// Subscriptions held by one owner
    async fn list_subscriptions(
        &self,
        ctx: &RequestContext,
        owner: OwnerRef,
        query: ResourceQuery,
    ) -> AppResult<Outcome<Listing<SubscriptionView>>>;

    async fn show_subscription(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        includes: &Includes,
    ) -> AppResult<Outcome<SubscriptionView>>;

    async fn create_subscription(
        &self,
        ctx: &RequestContext,
        input: CreateSubscription,
    ) -> AppResult<Outcome<Subscription>>;
}

pub struct SubscriptionManager {
    subscriptions: Arc<dyn SubscriptionRepository>,
    owners: Arc<dyn OwnerRepository>,
    stores: Arc<dyn StoreRepository>,
    notifier: Arc<dyn Notifier>,
}

impl SubscriptionManager {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        owners: Arc<dyn OwnerRepository>,
        stores: Arc<dyn StoreRepository>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            subscriptions,
            owners,
            stores,
            notifier,
        }
    }

    async fn announce(&self, subscription: &Subscription, plan: &SubscriptionPlan) {
        let notification = NewNotification {
            user_id: subscription.user_id,
            kind: NOTIFICATION_SUBSCRIPTION_CREATED.to_string(),
            data: json!({
                "subscription_id": subscription.id,
                "subscription_plan_id": plan.id,
                "subscription_plan_name": plan.name,
                "owner_type": subscription.owner.kind,
                "owner_id": subscription.owner.id,
                "start_at": subscription.start_at,
                "end_at": subscription.end_at,
            }),
        };

        // The subscription stands even when the inbox write fails
        if let Err(e) = self.notifier.notify(notification).await {
            warn!(
                subscription_id = %subscription.id,
                error = %e,
                "Subscription notification failed"
            );
        }
    }
}

#[async_trait]
impl SubscriptionService for SubscriptionManager {
    async fn list_subscriptions(
        &self,
        ctx: &RequestContext,
        owner: OwnerRef,
        query: ResourceQuery,
    ) -> AppResult<Outcome<Listing<SubscriptionView>>> {
        let Some(resolved) = self.owners.find_owner(owner).await? else {
            return Ok(owner_not_found(owner.kind, None));
        };
        if !controls_owner(ctx, self.stores.as_ref(), &resolved).await?
            || !scope_permitted(ctx, &query, Restriction::Owner(owner))
        {
            return Ok(Outcome::forbidden::<Subscription>(Action::Viewed));
        }

        let query = query.scoped_or(|| Scope::latest(Restriction::Owner(owner)));
        let subscriptions = self.subscriptions.list(&query).await?;

        let mut plans: HashMap<Uuid, SubscriptionPlan> = HashMap::new();
        if query.includes.wants("subscription_plan") {
            let mut ids: Vec<Uuid> = subscriptions
                .items()
                .iter()
                .map(|s| s.subscription_plan_id)
                .collect();
            ids.sort_unstable();
            ids.dedup();
            plans = self
                .subscriptions
                .find_plans(ids)
                .await?
                .into_iter()
                .map(|plan| (plan.id, plan))
                .collect();
        }

        Ok(Outcome::Found(subscriptions.map(|subscription| {
            let subscription_plan = plans.get(&subscription.subscription_plan_id).cloned();
            SubscriptionView {
                subscription,
                subscription_plan,
            }
        })))
    }

    async fn show_subscription(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        includes: &Includes,
    ) -> AppResult<Outcome<SubscriptionView>> {
        let Some(subscription) = self.subscriptions.find_by_id(id).await? else {
            return Ok(Outcome::not_found::<Subscription>(None));
        };

        let permitted = ctx.is_self_or_super_admin(subscription.user_id)
            || match self.owners.find_owner(subscription.owner).await? {
                Some(owner) => controls_owner(ctx, self.stores.as_ref(), &owner).await?,
                None => false,
            };
        if !permitted {
            return Ok(Outcome::forbidden::<Subscription>(Action::Viewed));
        }

        let subscription_plan = match includes.wants("subscription_plan") {
            true => {
                self.subscriptions
                    .find_plan(subscription.subscription_plan_id)
                    .await?
            }
            false => None,
        };
        Ok(Outcome::Found(SubscriptionView {
            subscription,
            subscription_plan,
        }))
    }

    async fn create_subscription(
        &self,
        ctx: &RequestContext,
        input: CreateSubscription,
    ) -> AppResult<Outcome<Subscription>> {
        let Some(user_id) = ctx.user_id() else {
            return Ok(Outcome::forbidden::<Subscription>(Action::Created));
        };
        let Some(owner) = self.owners.find_owner(input.owner).await? else {
            return Ok(owner_not_found(input.owner.kind, Some(Action::Created)));
        };
        if !controls_owner(ctx, self.stores.as_ref(), &owner).await? {
            warn!(
                owner_id = %input.owner.id,
                owner_type = %input.owner.kind,
                "Subscription creation refused"
            );
            return Ok(Outcome::forbidden::<Subscription>(Action::Created));
        }
        let Some(plan) = self.subscriptions.find_plan(input.subscription_plan_id).await? else {
            return Ok(Outcome::not_found::<SubscriptionPlan>(Some(Action::Created)));
        };
        if !plan.active {
            return Err(AppError::validation(format!(
                "The subscription plan {} is no longer available",
                plan.name
            )));
        }

        let now = Utc::now();
        let prior_end = match plan.kind {
            PlanKind::Duration => self.subscriptions.latest_end_at(input.owner).await?,
            PlanKind::Credits => None,
        };
        let new_subscription =
            NewSubscription::for_plan(user_id, input.owner, &plan, now, prior_end)?;

        let (subscription, granted) = self
            .subscriptions
            .create_with_grant(new_subscription)
            .await?;
        info!(
            subscription_id = %subscription.id,
            owner_id = %subscription.owner.id,
            start_at = %subscription.start_at,
            "Subscription created"
        );
        if subscription.sms_credits > 0 && !granted {
            warn!(
                subscription_id = %subscription.id,
                owner_type = %subscription.owner.kind,
                "Owner holds no SMS balance, credits not granted"
            );
        }

        self.announce(&subscription, &plan).await;
        Ok(Outcome::show_created(subscription))
    }
}
