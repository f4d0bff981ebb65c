//! Customer database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::Customer;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub store_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub mobile_number: String,
    pub total_orders: i32,
    pub total_spend: i64,
    pub last_order_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Customer {
    fn from(model: Model) -> Self {
        Customer {
            id: model.id,
            store_id: model.store_id,
            first_name: model.first_name,
            last_name: model.last_name,
            mobile_number: model.mobile_number,
            total_orders: model.total_orders,
            total_spend: model.total_spend,
            last_order_at: model.last_order_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
