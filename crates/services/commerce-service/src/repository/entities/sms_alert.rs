//! SMS alert account database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::SmsAlert;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sms_alerts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub sms_credits: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for SmsAlert {
    fn from(model: Model) -> Self {
        SmsAlert {
            id: model.id,
            user_id: model.user_id,
            sms_credits: model.sms_credits,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
