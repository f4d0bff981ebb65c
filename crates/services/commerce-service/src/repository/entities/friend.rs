//! Friend database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::Friend;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "friends")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub mobile_number: String,
    pub last_selected_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Friend {
    fn from(model: Model) -> Self {
        Friend {
            id: model.id,
            user_id: model.user_id,
            name: model.name,
            mobile_number: model.mobile_number,
            last_selected_at: model.last_selected_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
