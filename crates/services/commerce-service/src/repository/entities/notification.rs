//! Notification database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::Notification;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub data: Json,
    /// NULL until the user reads it
    pub read_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Notification {
    fn from(model: Model) -> Self {
        Notification {
            id: model.id,
            user_id: model.user_id,
            kind: model.kind,
            data: model.data,
            read_at: model.read_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
