//! Delivery address database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::DeliveryAddress;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "delivery_addresses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub address_line: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for DeliveryAddress {
    fn from(model: Model) -> Self {
        DeliveryAddress {
            id: model.id,
            user_id: model.user_id,
            name: model.name,
            address_line: model.address_line,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
