//! Friends a user sends SMS alerts and shortcodes to.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::access::scope_permitted;
use super::delivery_address_service::owned_rows;
use crate::repository::FriendRepository;
use common::AppResult;
use domain::{
    ensure_mobile_number, validate_input, Action, CreateFriend, Friend, Listing, Outcome,
    RequestContext, ResourceQuery, Restriction, Scope, UpdateFriend,
};

#[async_trait]
pub trait FriendService: Send + Sync {
    async fn list_friends(
        &self,
        ctx: &RequestContext,
        query: ResourceQuery,
    ) -> AppResult<Outcome<Listing<Friend>>>;

    async fn show_friend(&self, ctx: &RequestContext, id: Uuid) -> AppResult<Outcome<Friend>>;

    async fn create_friend(
        &self,
        ctx: &RequestContext,
        input: CreateFriend,
    ) -> AppResult<Outcome<Friend>>;

    async fn update_friend(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        changes: UpdateFriend,
    ) -> AppResult<Outcome<Friend>>;

    async fn delete_friends(&self, ctx: &RequestContext, ids: Vec<Uuid>)
        -> AppResult<Outcome<Friend>>;

    /// Record that the friend was just picked as a recipient
    async fn mark_last_selected(&self, ctx: &RequestContext, id: Uuid)
        -> AppResult<Outcome<Friend>>;
}

pub struct FriendManager {
    friends: Arc<dyn FriendRepository>,
}

impl FriendManager {
    pub fn new(friends: Arc<dyn FriendRepository>) -> Self {
        Self { friends }
    }

    async fn find_own(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        action: Action,
    ) -> AppResult<Result<Friend, Outcome<Friend>>> {
        Ok(match self.friends.find_by_id(id).await? {
            Some(friend) if ctx.is_self_or_super_admin(friend.user_id) => Ok(friend),
            Some(_) => {
                warn!(friend_id = %id, action = action.verb(), "Friend access refused");
                Err(Outcome::forbidden::<Friend>(action))
            }
            None => Err(Outcome::not_found::<Friend>(
                Some(action).filter(|a| *a != Action::Viewed),
            )),
        })
    }
}

#[async_trait]
impl FriendService for FriendManager {
    async fn list_friends(
        &self,
        ctx: &RequestContext,
        query: ResourceQuery,
    ) -> AppResult<Outcome<Listing<Friend>>> {
        let Some(user_id) = ctx.user_id() else {
            return Ok(Outcome::forbidden::<Friend>(Action::Viewed));
        };
        if !scope_permitted(ctx, &query, Restriction::User(user_id)) {
            return Ok(Outcome::forbidden::<Friend>(Action::Viewed));
        }

        let query = query.scoped_or(|| Scope::latest(Restriction::User(user_id)));
        Ok(Outcome::Found(self.friends.list(&query).await?))
    }

    async fn show_friend(&self, ctx: &RequestContext, id: Uuid) -> AppResult<Outcome<Friend>> {
        Ok(match self.find_own(ctx, id, Action::Viewed).await? {
            Ok(friend) => Outcome::Found(friend),
            Err(refused) => refused,
        })
    }

    async fn create_friend(
        &self,
        ctx: &RequestContext,
        input: CreateFriend,
    ) -> AppResult<Outcome<Friend>> {
        let Some(user_id) = ctx.user_id() else {
            return Ok(Outcome::forbidden::<Friend>(Action::Created));
        };
        validate_input(&input)?;
        ensure_mobile_number(&input.mobile_number)?;

        let friend = self.friends.create(user_id, input).await?;
        info!(friend_id = %friend.id, user_id = %user_id, "Friend created");
        Ok(Outcome::show_created(friend))
    }

    async fn update_friend(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        changes: UpdateFriend,
    ) -> AppResult<Outcome<Friend>> {
        if let Err(refused) = self.find_own(ctx, id, Action::Updated).await? {
            return Ok(refused);
        }
        validate_input(&changes)?;
        if let Some(mobile_number) = &changes.mobile_number {
            ensure_mobile_number(mobile_number)?;
        }

        let friend = self.friends.update(id, changes).await?;
        info!(friend_id = %id, "Friend updated");
        Ok(Outcome::show_updated(friend))
    }

    async fn delete_friends(
        &self,
        ctx: &RequestContext,
        ids: Vec<Uuid>,
    ) -> AppResult<Outcome<Friend>> {
        let Some(restriction) = owned_rows(ctx) else {
            return Ok(Outcome::forbidden::<Friend>(Action::Deleted));
        };

        let deleted = self.friends.delete_many(ids, restriction).await?;
        info!(deleted, "Friends deleted");
        Ok(Outcome::counted::<Friend>(Action::Deleted, deleted))
    }

    async fn mark_last_selected(
        &self,
        ctx: &RequestContext,
        id: Uuid,
    ) -> AppResult<Outcome<Friend>> {
        if let Err(refused) = self.find_own(ctx, id, Action::Updated).await? {
            return Ok(refused);
        }

        let friend = self.friends.mark_last_selected(id, Utc::now()).await?;
        Ok(Outcome::show_updated(friend))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockFriendRepository;
    use crate::service::test_support::{super_admin, user};
    use domain::RefusalReason;
    use mockall::predicate::eq;

    fn friend(user_id: Uuid) -> Friend {
        Friend {
            id: Uuid::new_v4(),
            user_id,
            name: "Kago".to_string(),
            mobile_number: "+26772000001".to_string(),
            last_selected_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn marks_own_friend_as_last_selected() {
        let user_id = Uuid::new_v4();
        let found = friend(user_id);
        let id = found.id;
        let selected = Friend {
            last_selected_at: Some(Utc::now()),
            ..found.clone()
        };

        let mut friends = MockFriendRepository::new();
        friends
            .expect_find_by_id()
            .with(eq(id))
            .returning(move |_| Ok(Some(found.clone())));
        friends
            .expect_mark_last_selected()
            .withf(move |friend_id, _| *friend_id == id)
            .times(1)
            .returning(move |_, _| Ok(selected.clone()));

        let outcome = FriendManager::new(Arc::new(friends))
            .mark_last_selected(&user(user_id), id)
            .await
            .unwrap();

        assert_eq!(outcome.message(), Some("Friend updated"));
        assert!(outcome.resource().unwrap().last_selected_at.is_some());
    }

    #[tokio::test]
    async fn other_users_friend_is_forbidden() {
        let found = friend(Uuid::new_v4());
        let mut friends = MockFriendRepository::new();
        friends
            .expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));

        let outcome = FriendManager::new(Arc::new(friends))
            .update_friend(&user(Uuid::new_v4()), Uuid::new_v4(), UpdateFriend::default())
            .await
            .unwrap();

        assert_eq!(
            outcome.refusal().map(|r| r.reason),
            Some(RefusalReason::Forbidden)
        );
    }

    #[tokio::test]
    async fn missing_friend_on_show_has_no_action_flag() {
        let mut friends = MockFriendRepository::new();
        friends.expect_find_by_id().returning(|_| Ok(None));

        let outcome = FriendManager::new(Arc::new(friends))
            .show_friend(&super_admin(), Uuid::new_v4())
            .await
            .unwrap();

        let refusal = outcome.refusal().unwrap();
        assert_eq!(refusal.reason, RefusalReason::NotFound);
        assert_eq!(refusal.action, None);
    }

    #[tokio::test]
    async fn super_admin_bulk_delete_spans_all_users() {
        let mut friends = MockFriendRepository::new();
        friends
            .expect_delete_many()
            .withf(|_, restriction| *restriction == Restriction::Everything)
            .returning(|ids, _| Ok(ids.len() as u64));

        let outcome = FriendManager::new(Arc::new(friends))
            .delete_friends(&super_admin(), vec![Uuid::new_v4(), Uuid::new_v4()])
            .await
            .unwrap();

        assert_eq!(outcome.message(), Some("2 friends deleted"));
    }
}
