//! Shortcode issuance, lookup and expiry.
//!
//! Issuance reuses codes aggressively (extend, then recycle, then generate);
//! the store layer owns that decision and its transaction. This layer checks
//! that the caller controls the owner and resolves codes back to owners.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use super::access::{controls_owner, owner_not_found};
use super::views::ShortcodeView;
use crate::repository::{OwnerRepository, ShortcodeRepository, StoreRepository};
use common::{AppError, AppResult};
use domain::{
    Action, DomainError, Includes, IssueShortcode, OwnerRef, Outcome, RequestContext, Shortcode,
    ShortcodeOwnerPayload,
};

#[async_trait]
pub trait ShortcodeService: Send + Sync {
    /// Bind a code to (owner, action), extending or recycling where possible
    async fn issue_shortcode(
        &self,
        ctx: &RequestContext,
        request: IssueShortcode,
        includes: &Includes,
    ) -> AppResult<Outcome<ShortcodeView>>;

    /// Resolve a code to its owner and the links offered for its action.
    ///
    /// A code that was never issued is an error, not an outcome.
    async fn show_owner(&self, ctx: &RequestContext, code: &str)
        -> AppResult<Outcome<ShortcodeOwnerPayload>>;

    /// Expire every code held by the owner
    async fn expire_shortcodes(&self, ctx: &RequestContext, owner: OwnerRef)
        -> AppResult<Outcome<Shortcode>>;
}

pub struct ShortcodeManager {
    shortcodes: Arc<dyn ShortcodeRepository>,
    owners: Arc<dyn OwnerRepository>,
    stores: Arc<dyn StoreRepository>,
    ttl: Duration,
}

impl ShortcodeManager {
    pub fn new(
        shortcodes: Arc<dyn ShortcodeRepository>,
        owners: Arc<dyn OwnerRepository>,
        stores: Arc<dyn StoreRepository>,
        ttl: Duration,
    ) -> Self {
        Self {
            shortcodes,
            owners,
            stores,
            ttl,
        }
    }
}

#[async_trait]
impl ShortcodeService for ShortcodeManager {
    async fn issue_shortcode(
        &self,
        ctx: &RequestContext,
        request: IssueShortcode,
        includes: &Includes,
    ) -> AppResult<Outcome<ShortcodeView>> {
        let Some(owner) = self.owners.find_owner(request.owner).await? else {
            return Ok(owner_not_found(request.owner.kind, Some(Action::Saved)));
        };
        if !controls_owner(ctx, self.stores.as_ref(), &owner).await? {
            warn!(
                owner_id = %request.owner.id,
                owner_type = %request.owner.kind,
                "Shortcode issuance refused"
            );
            return Ok(Outcome::forbidden::<Shortcode>(Action::Saved));
        }

        let now = Utc::now();
        if request.expires_at.is_some_and(|at| at <= now) {
            return Err(AppError::validation("The shortcode expiry must be in the future"));
        }

        let expires_at = request.expiry(now, self.ttl);
        let shortcode = self.shortcodes.issue(request, expires_at).await?;
        info!(
            code = %shortcode.code,
            action = %shortcode.action,
            owner_id = %shortcode.owner.id,
            expires_at = %shortcode.expires_at,
            "Shortcode issued"
        );

        let owner = includes.wants("owner").then_some(owner);
        Ok(Outcome::show_saved(ShortcodeView { shortcode, owner }, Action::Saved))
    }

    async fn show_owner(
        &self,
        ctx: &RequestContext,
        code: &str,
    ) -> AppResult<Outcome<ShortcodeOwnerPayload>> {
        let Some(shortcode) = self.shortcodes.find_by_code(code).await? else {
            return Err(DomainError::unknown_shortcode(code).into());
        };
        if shortcode.is_expired(Utc::now()) {
            return Ok(Outcome::not_found::<Shortcode>(None));
        }
        if !shortcode.is_usable_by(ctx.user_id()) {
            return Ok(Outcome::forbidden::<Shortcode>(Action::Viewed));
        }

        let Some(owner) = self.owners.find_owner(shortcode.owner).await? else {
            return Ok(owner_not_found(shortcode.owner.kind, None));
        };
        Ok(Outcome::Found(ShortcodeOwnerPayload::new(&shortcode, owner)))
    }

    async fn expire_shortcodes(
        &self,
        ctx: &RequestContext,
        owner: OwnerRef,
    ) -> AppResult<Outcome<Shortcode>> {
        let Some(resolved) = self.owners.find_owner(owner).await? else {
            return Ok(owner_not_found(owner.kind, Some(Action::Updated)));
        };
        if !controls_owner(ctx, self.stores.as_ref(), &resolved).await? {
            return Ok(Outcome::forbidden::<Shortcode>(Action::Updated));
        }

        let expired = self.shortcodes.expire(owner, Utc::now()).await?;
        info!(owner_id = %owner.id, owner_type = %owner.kind, expired, "Shortcodes expired");
        Ok(match expired {
            0 => Outcome::not_found::<Shortcode>(Some(Action::Updated)),
            _ => Outcome::done::<Shortcode>(Action::Updated),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{MockOwnerRepository, MockShortcodeRepository, MockStoreRepository};
    use crate::service::test_support::{guest, store, user};
    use chrono::DateTime;
    use domain::{OwnerKind, RefusalReason, ShortcodeAction, ShortcodeOwner};
    use std::sync::Mutex;
    use uuid::Uuid;

    fn shortcode(owner: OwnerRef, expires_at: DateTime<Utc>) -> Shortcode {
        Shortcode {
            id: Uuid::new_v4(),
            code: "4821".to_string(),
            action: ShortcodeAction::Pay,
            owner,
            reserved_for_user_id: None,
            expires_at,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn owners_with(owner: ShortcodeOwner) -> MockOwnerRepository {
        let mut owners = MockOwnerRepository::new();
        owners
            .expect_find_owner()
            .returning(move |_| Ok(Some(owner.clone())));
        owners
    }

    fn manager(
        shortcodes: MockShortcodeRepository,
        owners: MockOwnerRepository,
    ) -> ShortcodeManager {
        ShortcodeManager::new(
            Arc::new(shortcodes),
            Arc::new(owners),
            Arc::new(MockStoreRepository::new()),
            Duration::hours(24),
        )
    }

    #[tokio::test]
    async fn reissue_keeps_the_code_and_moves_the_expiry() {
        let user_id = Uuid::new_v4();
        let shop = store(user_id);
        let owner = OwnerRef::store(shop.id);

        // Stands in for the extend branch of the store
        let held: Arc<Mutex<Option<Shortcode>>> = Arc::new(Mutex::new(None));
        let mut shortcodes = MockShortcodeRepository::new();
        shortcodes
            .expect_issue()
            .times(2)
            .returning(move |request, expires_at| {
                let mut held = held.lock().unwrap();
                let issued = match held.take() {
                    Some(existing) => Shortcode {
                        expires_at,
                        ..existing
                    },
                    None => shortcode(request.owner, expires_at),
                };
                *held = Some(issued.clone());
                Ok(issued)
            });

        let manager = manager(shortcodes, owners_with(ShortcodeOwner::Store(shop)));
        let ctx = user(user_id);
        let later = Utc::now() + Duration::days(3);

        let first = manager
            .issue_shortcode(
                &ctx,
                IssueShortcode::new(owner, ShortcodeAction::Pay),
                &Includes::default(),
            )
            .await
            .unwrap()
            .into_resource()
            .unwrap();
        let second = manager
            .issue_shortcode(
                &ctx,
                IssueShortcode::new(owner, ShortcodeAction::Pay).expiring_at(later),
                &Includes::default(),
            )
            .await
            .unwrap()
            .into_resource()
            .unwrap();

        assert_eq!(first.shortcode.code, second.shortcode.code);
        assert_eq!(second.shortcode.expires_at, later);
        assert!(first.shortcode.expires_at < later);
    }

    #[tokio::test]
    async fn default_expiry_uses_the_configured_ttl() {
        let user_id = Uuid::new_v4();
        let shop = store(user_id);
        let owner = OwnerRef::store(shop.id);
        let before = Utc::now();

        let mut shortcodes = MockShortcodeRepository::new();
        shortcodes
            .expect_issue()
            .withf(move |_, expires_at| {
                *expires_at >= before + Duration::hours(24)
                    && *expires_at <= Utc::now() + Duration::hours(24)
            })
            .returning(|request, expires_at| Ok(shortcode(request.owner, expires_at)));

        let outcome = manager(shortcodes, owners_with(ShortcodeOwner::Store(shop)))
            .issue_shortcode(
                &user(user_id),
                IssueShortcode::new(owner, ShortcodeAction::Pay),
                &["owner"].into_iter().collect::<Includes>(),
            )
            .await
            .unwrap();

        assert_eq!(outcome.message(), Some("Shortcode saved"));
        assert!(outcome.resource().unwrap().owner.is_some());
    }

    #[tokio::test]
    async fn past_expiry_is_rejected() {
        let user_id = Uuid::new_v4();
        let shop = store(user_id);
        let owner = OwnerRef::store(shop.id);

        let result = manager(
            MockShortcodeRepository::new(),
            owners_with(ShortcodeOwner::Store(shop)),
        )
        .issue_shortcode(
            &user(user_id),
            IssueShortcode::new(owner, ShortcodeAction::Visit)
                .expiring_at(Utc::now() - Duration::minutes(1)),
            &Includes::default(),
        )
        .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn unknown_code_is_an_error() {
        let mut shortcodes = MockShortcodeRepository::new();
        shortcodes.expect_find_by_code().returning(|_| Ok(None));

        let result = manager(shortcodes, MockOwnerRepository::new())
            .show_owner(&guest(), "0000")
            .await;

        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn reserved_code_is_hidden_from_other_users() {
        let mut reserved = shortcode(
            OwnerRef::store(Uuid::new_v4()),
            Utc::now() + Duration::hours(1),
        );
        reserved.reserved_for_user_id = Some(Uuid::new_v4());

        let mut shortcodes = MockShortcodeRepository::new();
        shortcodes
            .expect_find_by_code()
            .returning(move |_| Ok(Some(reserved.clone())));

        let outcome = manager(shortcodes, MockOwnerRepository::new())
            .show_owner(&user(Uuid::new_v4()), "4821")
            .await
            .unwrap();

        assert_eq!(
            outcome.refusal().map(|r| r.reason),
            Some(RefusalReason::Forbidden)
        );
    }

    #[tokio::test]
    async fn live_code_resolves_to_owner_links() {
        let shop = store(Uuid::new_v4());
        let live = shortcode(OwnerRef::store(shop.id), Utc::now() + Duration::hours(1));

        let mut shortcodes = MockShortcodeRepository::new();
        shortcodes
            .expect_find_by_code()
            .returning(move |_| Ok(Some(live.clone())));

        let outcome = manager(shortcodes, owners_with(ShortcodeOwner::Store(shop)))
            .show_owner(&guest(), "4821")
            .await
            .unwrap();

        let payload = outcome.into_resource().unwrap();
        assert_eq!(payload.owner_type, OwnerKind::Store);
        assert!(payload
            .links
            .iter()
            .any(|link| link.rel == "show_payment_methods"));
    }

    #[tokio::test]
    async fn expired_code_reads_as_missing() {
        let stale = shortcode(OwnerRef::store(Uuid::new_v4()), Utc::now() - Duration::hours(1));
        let mut shortcodes = MockShortcodeRepository::new();
        shortcodes
            .expect_find_by_code()
            .returning(move |_| Ok(Some(stale.clone())));

        let outcome = manager(shortcodes, MockOwnerRepository::new())
            .show_owner(&guest(), "4821")
            .await
            .unwrap();

        assert_eq!(outcome.message(), Some("Shortcode does not exist"));
    }
}
