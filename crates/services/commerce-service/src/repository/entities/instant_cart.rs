//! Instant cart database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::InstantCart;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "instant_carts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub store_id: Uuid,
    pub name: String,
    pub active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for InstantCart {
    fn from(model: Model) -> Self {
        InstantCart {
            id: model.id,
            store_id: model.store_id,
            name: model.name,
            active: model.active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
