//! Resolution of polymorphic owners (store, AI assistant, SMS alert, instant cart).

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, EntityTrait};

use super::entities::{ai_assistant, instant_cart, sms_alert, store};
use common::AppResult;
use domain::{
    AiAssistant, InstantCart, OwnerKind, OwnerRef, ShortcodeOwner, SmsAlert, Store,
};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait OwnerRepository: Send + Sync {
    async fn find_owner(&self, owner: OwnerRef) -> AppResult<Option<ShortcodeOwner>>;
}

pub struct OwnerStore {
    db: DatabaseConnection,
}

impl OwnerStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OwnerRepository for OwnerStore {
    async fn find_owner(&self, owner: OwnerRef) -> AppResult<Option<ShortcodeOwner>> {
        let resolved = match owner.kind {
            OwnerKind::Store => store::Entity::find_by_id(owner.id)
                .one(&self.db)
                .await?
                .map(|model| ShortcodeOwner::Store(Store::from(model))),
            OwnerKind::AiAssistant => ai_assistant::Entity::find_by_id(owner.id)
                .one(&self.db)
                .await?
                .map(|model| ShortcodeOwner::AiAssistant(AiAssistant::from(model))),
            OwnerKind::SmsAlert => sms_alert::Entity::find_by_id(owner.id)
                .one(&self.db)
                .await?
                .map(|model| ShortcodeOwner::SmsAlert(SmsAlert::from(model))),
            OwnerKind::InstantCart => instant_cart::Entity::find_by_id(owner.id)
                .one(&self.db)
                .await?
                .map(|model| ShortcodeOwner::InstantCart(InstantCart::from(model))),
        };
        Ok(resolved)
    }
}
