//! Store quota database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::StoreQuota;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "store_quotas")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub store_id: Uuid,
    pub sms_credits: i32,
    pub email_credits: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for StoreQuota {
    fn from(model: Model) -> Self {
        StoreQuota {
            id: model.id,
            store_id: model.store_id,
            sms_credits: model.sms_credits,
            email_credits: model.email_credits,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
