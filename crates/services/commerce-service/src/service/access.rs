//! Two-tier authorization: the global super admin flag first, then
//! ownership of the resource being touched.

use uuid::Uuid;

use crate::repository::StoreRepository;
use common::AppResult;
use domain::{
    Action, AiAssistant, InstantCart, OwnerKind, Outcome, RequestContext, ResourceQuery,
    Restriction, ShortcodeOwner, SmsAlert, Store,
};

/// Super admin, the store creator, or one of its admins.
pub(crate) async fn manages_store(
    ctx: &RequestContext,
    stores: &dyn StoreRepository,
    store_id: Uuid,
) -> AppResult<bool> {
    if ctx.is_super_admin() {
        return Ok(true);
    }
    match ctx.user_id() {
        Some(user_id) => stores.is_manager(store_id, user_id).await,
        None => Ok(false),
    }
}

/// Whether the caller may act on behalf of a shortcode or subscription owner.
pub(crate) async fn controls_owner(
    ctx: &RequestContext,
    stores: &dyn StoreRepository,
    owner: &ShortcodeOwner,
) -> AppResult<bool> {
    if ctx.is_super_admin() {
        return Ok(true);
    }
    let Some(user_id) = ctx.user_id() else {
        return Ok(false);
    };

    match owner {
        ShortcodeOwner::Store(store) if store.user_id == user_id => Ok(true),
        ShortcodeOwner::Store(store) => stores.is_manager(store.id, user_id).await,
        ShortcodeOwner::InstantCart(cart) => stores.is_manager(cart.store_id, user_id).await,
        ShortcodeOwner::AiAssistant(_) | ShortcodeOwner::SmsAlert(_) => {
            Ok(owner.user_id() == Some(user_id))
        }
    }
}

/// A caller-supplied scope may only widen beyond `allowed` for super admins.
pub(crate) fn scope_permitted(
    ctx: &RequestContext,
    query: &ResourceQuery,
    allowed: Restriction,
) -> bool {
    ctx.is_super_admin()
        || query
            .scope()
            .map_or(true, |scope| scope.restriction == allowed)
}

/// "<Owner> does not exist" for whichever owner kind was referenced.
pub(crate) fn owner_not_found<T>(kind: OwnerKind, action: Option<Action>) -> Outcome<T> {
    match kind {
        OwnerKind::Store => Outcome::not_found::<Store>(action),
        OwnerKind::AiAssistant => Outcome::not_found::<AiAssistant>(action),
        OwnerKind::SmsAlert => Outcome::not_found::<SmsAlert>(action),
        OwnerKind::InstantCart => Outcome::not_found::<InstantCart>(action),
    }
}
