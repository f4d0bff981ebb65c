//! Subscription and subscription plan data access.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use super::base::{fetch_listing, scoped_select, ScopedEntity};
use super::credits::grant_sms_credits;
use super::entities::subscription::{self, ActiveModel, Entity as SubscriptionEntity};
use super::entities::subscription_plan::{self, Entity as SubscriptionPlanEntity};
use common::AppResult;
use domain::{
    Listing, NewSubscription, OwnerRef, ResourceQuery, Restriction, Subscription,
    SubscriptionPlan,
};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

impl ScopedEntity for SubscriptionEntity {
    fn id_column() -> subscription::Column {
        subscription::Column::Id
    }

    fn created_at_column() -> subscription::Column {
        subscription::Column::CreatedAt
    }

    fn restrict(restriction: &Restriction) -> Option<Condition> {
        match restriction {
            Restriction::Everything => Some(Condition::all()),
            Restriction::User(user_id) => {
                Some(Condition::all().add(subscription::Column::UserId.eq(*user_id)))
            }
            Restriction::Owner(owner) => Some(owner_condition(owner)),
            Restriction::Store(store_id) => Some(owner_condition(&OwnerRef::store(*store_id))),
        }
    }
}

fn owner_condition(owner: &OwnerRef) -> Condition {
    Condition::all()
        .add(subscription::Column::OwnerType.eq(owner.kind.as_str()))
        .add(subscription::Column::OwnerId.eq(owner.id))
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    async fn list(&self, query: &ResourceQuery) -> AppResult<Listing<Subscription>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Subscription>>;

    async fn find_plan(&self, id: Uuid) -> AppResult<Option<SubscriptionPlan>>;

    async fn find_plans(&self, ids: Vec<Uuid>) -> AppResult<Vec<SubscriptionPlan>>;

    /// Latest end date among the owner's expiring subscriptions
    async fn latest_end_at(&self, owner: OwnerRef) -> AppResult<Option<DateTime<Utc>>>;

    /// Insert the subscription and credit its SMS to the owner in one
    /// transaction. The flag is false when the owner holds no SMS balance.
    async fn create_with_grant(
        &self,
        subscription: NewSubscription,
    ) -> AppResult<(Subscription, bool)>;
}

pub struct SubscriptionStore {
    db: DatabaseConnection,
}

impl SubscriptionStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SubscriptionRepository for SubscriptionStore {
    async fn list(&self, query: &ResourceQuery) -> AppResult<Listing<Subscription>> {
        let select = scoped_select::<SubscriptionEntity>(query)?;
        let listing = fetch_listing(&self.db, select, query).await?;
        Ok(listing.try_map(Subscription::try_from)?)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Subscription>> {
        let result = SubscriptionEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Subscription::try_from).transpose()?)
    }

    async fn find_plan(&self, id: Uuid) -> AppResult<Option<SubscriptionPlan>> {
        let result = SubscriptionPlanEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(SubscriptionPlan::try_from).transpose()?)
    }

    async fn find_plans(&self, ids: Vec<Uuid>) -> AppResult<Vec<SubscriptionPlan>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = SubscriptionPlanEntity::find()
            .filter(subscription_plan::Column::Id.is_in(ids))
            .all(&self.db)
            .await?;
        Ok(models
            .into_iter()
            .map(SubscriptionPlan::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn latest_end_at(&self, owner: OwnerRef) -> AppResult<Option<DateTime<Utc>>> {
        let latest = SubscriptionEntity::find()
            .filter(owner_condition(&owner))
            .filter(subscription::Column::EndAt.is_not_null())
            .order_by_desc(subscription::Column::EndAt)
            .one(&self.db)
            .await?;
        Ok(latest.and_then(|model| model.end_at))
    }

    async fn create_with_grant(
        &self,
        subscription: NewSubscription,
    ) -> AppResult<(Subscription, bool)> {
        let now = Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(subscription.user_id),
            owner_type: Set(subscription.owner.kind.as_str().to_string()),
            owner_id: Set(subscription.owner.id),
            subscription_plan_id: Set(subscription.subscription_plan_id),
            sms_credits: Set(subscription.sms_credits),
            start_at: Set(subscription.start_at),
            end_at: Set(subscription.end_at),
            created_at: Set(now),
            updated_at: Set(now),
        };

        // Dropping the transaction on error rolls the insert back
        let txn = self.db.begin().await?;
        let model = active_model.insert(&txn).await?;
        let granted = if subscription.sms_credits > 0 {
            grant_sms_credits(&txn, subscription.owner, subscription.sms_credits).await?
        } else {
            false
        };
        txn.commit().await?;

        Ok((Subscription::try_from(model)?, granted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult};

    fn affected(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    fn new_subscription(owner: OwnerRef, sms_credits: i32) -> NewSubscription {
        let now = Utc::now();
        NewSubscription {
            user_id: Uuid::new_v4(),
            owner,
            subscription_plan_id: Uuid::new_v4(),
            sms_credits,
            start_at: now,
            end_at: Some(now + chrono::Duration::days(30)),
        }
    }

    fn inserted(subscription: &NewSubscription) -> subscription::Model {
        let now = Utc::now();
        subscription::Model {
            id: Uuid::new_v4(),
            user_id: subscription.user_id,
            owner_type: subscription.owner.kind.as_str().to_string(),
            owner_id: subscription.owner.id,
            subscription_plan_id: subscription.subscription_plan_id,
            sms_credits: subscription.sms_credits,
            start_at: subscription.start_at,
            end_at: subscription.end_at,
            created_at: now,
            updated_at: now,
        }
    }

    fn statements(db: DatabaseConnection) -> Vec<String> {
        db.into_transaction_log()
            .iter()
            .flat_map(|txn| txn.statements().iter().map(|stmt| stmt.sql.clone()))
            .collect()
    }

    #[tokio::test]
    async fn failed_grant_rolls_the_subscription_back() {
        let subscription = new_subscription(OwnerRef::store(Uuid::new_v4()), 100);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![inserted(&subscription)]])
            .append_exec_results([affected(1)])
            .append_exec_errors([DbErr::Custom("quota row locked".to_string())])
            .into_connection();
        let store = SubscriptionStore::new(db.clone());

        let result = store.create_with_grant(subscription).await;
        assert!(result.is_err());

        let sql = statements(db);
        assert_eq!(sql.first().map(String::as_str), Some("BEGIN"));
        assert!(sql[1].starts_with(r#"INSERT INTO "subscriptions""#));
        assert_eq!(sql.last().map(String::as_str), Some("ROLLBACK"));
        assert!(!sql.iter().any(|stmt| stmt == "COMMIT"));
    }

    #[tokio::test]
    async fn sms_alert_grant_commits_with_the_subscription() {
        let subscription = new_subscription(OwnerRef::sms_alert(Uuid::new_v4()), 40);
        let expected_owner = subscription.owner;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![inserted(&subscription)]])
            .append_exec_results([affected(1)])
            .into_connection();
        let store = SubscriptionStore::new(db.clone());

        let (created, granted) = store.create_with_grant(subscription).await.unwrap();
        assert!(granted);
        assert_eq!(created.owner, expected_owner);

        let sql = statements(db);
        assert!(sql[2].starts_with(r#"UPDATE "sms_alerts""#));
        assert_eq!(sql.last().map(String::as_str), Some("COMMIT"));
    }

    #[tokio::test]
    async fn creditless_plan_skips_the_grant() {
        let subscription = new_subscription(OwnerRef::store(Uuid::new_v4()), 0);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![inserted(&subscription)]])
            .into_connection();
        let store = SubscriptionStore::new(db.clone());

        let (_, granted) = store.create_with_grant(subscription).await.unwrap();
        assert!(!granted);

        let sql = statements(db);
        assert_eq!(sql.len(), 3);
        assert!(sql[1].starts_with(r#"INSERT INTO "subscriptions""#));
        assert_eq!(sql[2], "COMMIT");
    }
}
