//! AI assistant data access.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use super::base::{fetch_listing, scoped_select, ScopedEntity};
use super::entities::ai_assistant::{self, ActiveModel, Entity as AiAssistantEntity};
use common::{AppError, AppResult};
use domain::{
    AiAssistant, CreateAiAssistant, Listing, ResourceQuery, Restriction, UpdateAiAssistant,
};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

impl ScopedEntity for AiAssistantEntity {
    fn id_column() -> ai_assistant::Column {
        ai_assistant::Column::Id
    }

    fn created_at_column() -> ai_assistant::Column {
        ai_assistant::Column::CreatedAt
    }

    fn search_columns() -> Vec<ai_assistant::Column> {
        vec![ai_assistant::Column::Name, ai_assistant::Column::Description]
    }

    fn restrict(restriction: &Restriction) -> Option<Condition> {
        match restriction {
            Restriction::Everything => Some(Condition::all()),
            Restriction::User(user_id) => {
                Some(Condition::all().add(ai_assistant::Column::UserId.eq(*user_id)))
            }
            Restriction::Store(_) | Restriction::Owner(_) => None,
        }
    }
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AiAssistantRepository: Send + Sync {
    async fn list(&self, query: &ResourceQuery) -> AppResult<Listing<AiAssistant>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<AiAssistant>>;

    async fn create(&self, user_id: Uuid, input: CreateAiAssistant) -> AppResult<AiAssistant>;

    async fn update(&self, id: Uuid, changes: UpdateAiAssistant) -> AppResult<AiAssistant>;

    async fn delete(&self, id: Uuid) -> AppResult<u64>;
}

pub struct AiAssistantStore {
    db: DatabaseConnection,
}

impl AiAssistantStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AiAssistantRepository for AiAssistantStore {
    async fn list(&self, query: &ResourceQuery) -> AppResult<Listing<AiAssistant>> {
        let select = scoped_select::<AiAssistantEntity>(query)?;
        let listing = fetch_listing(&self.db, select, query).await?;
        Ok(listing.map(AiAssistant::from))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<AiAssistant>> {
        let result = AiAssistantEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(AiAssistant::from))
    }

    async fn create(&self, user_id: Uuid, input: CreateAiAssistant) -> AppResult<AiAssistant> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            name: Set(input.name),
            description: Set(input.description),
            remaining_paid_tokens: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await?;
        Ok(AiAssistant::from(model))
    }

    async fn update(&self, id: Uuid, changes: UpdateAiAssistant) -> AppResult<AiAssistant> {
        let assistant = AiAssistantEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = assistant.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(description) = changes.description {
            active.description = Set(Some(description));
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await?;
        Ok(AiAssistant::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<u64> {
        let result = AiAssistantEntity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected)
    }
}
