//! SMS message database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::SmsMessage;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sms_messages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub store_id: Option<Uuid>,
    pub recipient_mobile_number: String,
    pub content: String,
    pub sent: bool,
    pub error: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for SmsMessage {
    fn from(model: Model) -> Self {
        SmsMessage {
            id: model.id,
            store_id: model.store_id,
            recipient_mobile_number: model.recipient_mobile_number,
            content: model.content,
            sent: model.sent,
            error: model.error,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
