//! Review database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::Review;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub store_id: Uuid,
    pub user_id: Uuid,
    pub subject: String,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Review {
    fn from(model: Model) -> Self {
        Review {
            id: model.id,
            store_id: model.store_id,
            user_id: model.user_id,
            subject: model.subject,
            rating: model.rating,
            comment: model.comment,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
