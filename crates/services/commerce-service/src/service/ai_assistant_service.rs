//! AI assistants owned by a user.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::access::scope_permitted;
use crate::repository::AiAssistantRepository;
use common::AppResult;
use domain::{
    validate_input, Action, AiAssistant, CreateAiAssistant, Listing, Outcome, RequestContext,
    ResourceQuery, Restriction, Scope, UpdateAiAssistant,
};

#[async_trait]
pub trait AiAssistantService: Send + Sync {
    async fn list_assistants(
        &self,
        ctx: &RequestContext,
        query: ResourceQuery,
    ) -> AppResult<Outcome<Listing<AiAssistant>>>;

    async fn show_assistant(&self, ctx: &RequestContext, id: Uuid)
        -> AppResult<Outcome<AiAssistant>>;

    async fn create_assistant(
        &self,
        ctx: &RequestContext,
        input: CreateAiAssistant,
    ) -> AppResult<Outcome<AiAssistant>>;

    async fn update_assistant(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        changes: UpdateAiAssistant,
    ) -> AppResult<Outcome<AiAssistant>>;

    async fn delete_assistant(&self, ctx: &RequestContext, id: Uuid)
        -> AppResult<Outcome<AiAssistant>>;
}

pub struct AiAssistantManager {
    assistants: Arc<dyn AiAssistantRepository>,
}

impl AiAssistantManager {
    pub fn new(assistants: Arc<dyn AiAssistantRepository>) -> Self {
        Self { assistants }
    }

    async fn find_own(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        action: Action,
    ) -> AppResult<Result<AiAssistant, Outcome<AiAssistant>>> {
        Ok(match self.assistants.find_by_id(id).await? {
            Some(assistant) if ctx.is_self_or_super_admin(assistant.user_id) => Ok(assistant),
            Some(_) => {
                warn!(assistant_id = %id, action = action.verb(), "AI assistant access refused");
                Err(Outcome::forbidden::<AiAssistant>(action))
            }
            None => Err(Outcome::not_found::<AiAssistant>(
                Some(action).filter(|a| *a != Action::Viewed),
            )),
        })
    }
}

#[async_trait]
impl AiAssistantService for AiAssistantManager {
    async fn list_assistants(
        &self,
        ctx: &RequestContext,
        query: ResourceQuery,
    ) -> AppResult<Outcome<Listing<AiAssistant>>> {
        let Some(user_id) = ctx.user_id() else {
            return Ok(Outcome::forbidden::<AiAssistant>(Action::Viewed));
        };
        if !scope_permitted(ctx, &query, Restriction::User(user_id)) {
            return Ok(Outcome::forbidden::<AiAssistant>(Action::Viewed));
        }

        let query = query.scoped_or(|| Scope::latest(Restriction::User(user_id)));
        Ok(Outcome::Found(self.assistants.list(&query).await?))
    }

    async fn show_assistant(
        &self,
        ctx: &RequestContext,
        id: Uuid,
    ) -> AppResult<Outcome<AiAssistant>> {
        Ok(match self.find_own(ctx, id, Action::Viewed).await? {
            Ok(assistant) => Outcome::Found(assistant),
            Err(refused) => refused,
        })
    }

    async fn create_assistant(
        &self,
        ctx: &RequestContext,
        input: CreateAiAssistant,
    ) -> AppResult<Outcome<AiAssistant>> {
        let Some(user_id) = ctx.user_id() else {
            return Ok(Outcome::forbidden::<AiAssistant>(Action::Created));
        };
        validate_input(&input)?;

        let assistant = self.assistants.create(user_id, input).await?;
        info!(assistant_id = %assistant.id, user_id = %user_id, "AI assistant created");
        Ok(Outcome::show_created(assistant))
    }

    async fn update_assistant(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        changes: UpdateAiAssistant,
    ) -> AppResult<Outcome<AiAssistant>> {
        if let Err(refused) = self.find_own(ctx, id, Action::Updated).await? {
            return Ok(refused);
        }
        validate_input(&changes)?;

        let assistant = self.assistants.update(id, changes).await?;
        info!(assistant_id = %id, "AI assistant updated");
        Ok(Outcome::show_updated(assistant))
    }

    async fn delete_assistant(
        &self,
        ctx: &RequestContext,
        id: Uuid,
    ) -> AppResult<Outcome<AiAssistant>> {
        if let Err(refused) = self.find_own(ctx, id, Action::Deleted).await? {
            return Ok(refused);
        }

        self.assistants.delete(id).await?;
        info!(assistant_id = %id, "AI assistant deleted");
        Ok(Outcome::done::<AiAssistant>(Action::Deleted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockAiAssistantRepository;
    use crate::service::test_support::{guest, user};
    use chrono::Utc;
    use domain::RefusalReason;

    fn assistant(user_id: Uuid) -> AiAssistant {
        AiAssistant {
            id: Uuid::new_v4(),
            user_id,
            name: "Helper".to_string(),
            description: None,
            remaining_paid_tokens: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn owner_deletes_their_assistant() {
        let user_id = Uuid::new_v4();
        let found = assistant(user_id);
        let id = found.id;

        let mut assistants = MockAiAssistantRepository::new();
        assistants
            .expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        assistants
            .expect_delete()
            .withf(move |deleted| *deleted == id)
            .times(1)
            .returning(|_| Ok(1));

        let outcome = AiAssistantManager::new(Arc::new(assistants))
            .delete_assistant(&user(user_id), id)
            .await
            .unwrap();

        assert_eq!(outcome.message(), Some("AI assistant deleted"));
    }

    #[tokio::test]
    async fn invalid_name_never_reaches_the_store() {
        let result = AiAssistantManager::new(Arc::new(MockAiAssistantRepository::new()))
            .create_assistant(
                &user(Uuid::new_v4()),
                CreateAiAssistant {
                    name: String::new(),
                    description: None,
                },
            )
            .await;

        assert!(matches!(result, Err(common::AppError::Validation(_))));
    }

    #[tokio::test]
    async fn guest_sees_no_listing() {
        let outcome = AiAssistantManager::new(Arc::new(MockAiAssistantRepository::new()))
            .list_assistants(&guest(), ResourceQuery::new())
            .await
            .unwrap();

        assert_eq!(
            outcome.refusal().map(|r| r.reason),
            Some(RefusalReason::Forbidden)
        );
    }
}
