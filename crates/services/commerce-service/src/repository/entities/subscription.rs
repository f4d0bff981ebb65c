//! Subscription database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::{DomainError, OwnerRef, Subscription};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "subscriptions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub owner_type: String,
    pub owner_id: Uuid,
    pub subscription_plan_id: Uuid,
    pub sms_credits: i32,
    pub start_at: DateTimeUtc,
    /// NULL for subscriptions that never expire
    pub end_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Subscription {
    type Error = DomainError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Subscription {
            id: model.id,
            user_id: model.user_id,
            owner: OwnerRef::new(model.owner_type.parse()?, model.owner_id),
            subscription_plan_id: model.subscription_plan_id,
            sms_credits: model.sms_credits,
            start_at: model.start_at,
            end_at: model.end_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
