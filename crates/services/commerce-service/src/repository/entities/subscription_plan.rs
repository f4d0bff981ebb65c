//! Subscription plan database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::{DomainError, SubscriptionPlan};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "subscription_plans")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    /// "duration" or "credits"
    pub kind: String,
    pub price: i64,
    pub duration: Option<i32>,
    pub frequency: Option<String>,
    pub credits: Option<i32>,
    pub active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for SubscriptionPlan {
    type Error = DomainError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(SubscriptionPlan {
            id: model.id,
            name: model.name,
            kind: model.kind.parse()?,
            price: model.price,
            duration: model.duration,
            frequency: model.frequency,
            credits: model.credits,
            active: model.active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
