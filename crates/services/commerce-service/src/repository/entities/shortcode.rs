//! Shortcode database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::{DomainError, OwnerRef, Shortcode};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "shortcodes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    /// "pay" or "visit"
    pub action: String,
    pub owner_type: String,
    pub owner_id: Uuid,
    pub reserved_for_user_id: Option<Uuid>,
    pub expires_at: DateTimeUtc,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Shortcode {
    type Error = DomainError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Shortcode {
            id: model.id,
            code: model.code,
            action: model.action.parse()?,
            owner: OwnerRef::new(model.owner_type.parse()?, model.owner_id),
            reserved_for_user_id: model.reserved_for_user_id,
            expires_at: model.expires_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
