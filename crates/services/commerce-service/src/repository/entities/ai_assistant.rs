//! AI assistant database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::AiAssistant;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "ai_assistants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub remaining_paid_tokens: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for AiAssistant {
    fn from(model: Model) -> Self {
        AiAssistant {
            id: model.id,
            user_id: model.user_id,
            name: model.name,
            description: model.description,
            remaining_paid_tokens: model.remaining_paid_tokens,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
