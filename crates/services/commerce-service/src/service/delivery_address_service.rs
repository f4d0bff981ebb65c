//! Delivery addresses belong to the user who saved them.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::access::scope_permitted;
use crate::repository::DeliveryAddressRepository;
use common::AppResult;
use domain::{
    validate_input, Action, CreateDeliveryAddress, DeliveryAddress, Listing, Outcome,
    RequestContext, ResourceQuery, Restriction, Scope, UpdateDeliveryAddress,
};

#[async_trait]
pub trait DeliveryAddressService: Send + Sync {
    /// Addresses of the calling user (any scope for super admins)
    async fn list_addresses(
        &self,
        ctx: &RequestContext,
        query: ResourceQuery,
    ) -> AppResult<Outcome<Listing<DeliveryAddress>>>;

    async fn show_address(&self, ctx: &RequestContext, id: Uuid)
        -> AppResult<Outcome<DeliveryAddress>>;

    async fn create_address(
        &self,
        ctx: &RequestContext,
        input: CreateDeliveryAddress,
    ) -> AppResult<Outcome<DeliveryAddress>>;

    async fn update_address(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        changes: UpdateDeliveryAddress,
    ) -> AppResult<Outcome<DeliveryAddress>>;

    async fn delete_address(&self, ctx: &RequestContext, id: Uuid)
        -> AppResult<Outcome<DeliveryAddress>>;

    async fn delete_addresses(
        &self,
        ctx: &RequestContext,
        ids: Vec<Uuid>,
    ) -> AppResult<Outcome<DeliveryAddress>>;
}

pub struct DeliveryAddressManager {
    addresses: Arc<dyn DeliveryAddressRepository>,
}

impl DeliveryAddressManager {
    pub fn new(addresses: Arc<dyn DeliveryAddressRepository>) -> Self {
        Self { addresses }
    }
}

/// Rows the caller may bulk-delete: everything for super admins, their own otherwise.
pub(crate) fn owned_rows(ctx: &RequestContext) -> Option<Restriction> {
    if ctx.is_super_admin() {
        return Some(Restriction::Everything);
    }
    ctx.user_id().map(Restriction::User)
}

#[async_trait]
impl DeliveryAddressService for DeliveryAddressManager {
    async fn list_addresses(
        &self,
        ctx: &RequestContext,
        query: ResourceQuery,
    ) -> AppResult<Outcome<Listing<DeliveryAddress>>> {
        let Some(user_id) = ctx.user_id() else {
            return Ok(Outcome::forbidden::<DeliveryAddress>(Action::Viewed));
        };
        if !scope_permitted(ctx, &query, Restriction::User(user_id)) {
            return Ok(Outcome::forbidden::<DeliveryAddress>(Action::Viewed));
        }

        let query = query.scoped_or(|| Scope::latest(Restriction::User(user_id)));
        Ok(Outcome::Found(self.addresses.list(&query).await?))
    }

    async fn show_address(
        &self,
        ctx: &RequestContext,
        id: Uuid,
    ) -> AppResult<Outcome<DeliveryAddress>> {
        match self.addresses.find_by_id(id).await? {
            Some(address) if ctx.is_self_or_super_admin(address.user_id) => {
                Ok(Outcome::Found(address))
            }
            Some(_) => Ok(Outcome::forbidden::<DeliveryAddress>(Action::Viewed)),
            None => Ok(Outcome::not_found::<DeliveryAddress>(None)),
        }
    }

    async fn create_address(
        &self,
        ctx: &RequestContext,
        input: CreateDeliveryAddress,
    ) -> AppResult<Outcome<DeliveryAddress>> {
        let Some(user_id) = ctx.user_id() else {
            return Ok(Outcome::forbidden::<DeliveryAddress>(Action::Created));
        };
        validate_input(&input)?;

        let address = self.addresses.create(user_id, input).await?;
        info!(address_id = %address.id, user_id = %user_id, "Delivery address created");
        Ok(Outcome::show_created(address))
    }

    async fn update_address(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        changes: UpdateDeliveryAddress,
    ) -> AppResult<Outcome<DeliveryAddress>> {
        let Some(address) = self.addresses.find_by_id(id).await? else {
            return Ok(Outcome::not_found::<DeliveryAddress>(Some(Action::Updated)));
        };
        if !ctx.is_self_or_super_admin(address.user_id) {
            warn!(address_id = %id, "Delivery address update refused");
            return Ok(Outcome::forbidden::<DeliveryAddress>(Action::Updated));
        }
        validate_input(&changes)?;

        let address = self.addresses.update(id, changes).await?;
        info!(address_id = %id, "Delivery address updated");
        Ok(Outcome::show_updated(address))
    }

    async fn delete_address(
        &self,
        ctx: &RequestContext,
        id: Uuid,
    ) -> AppResult<Outcome<DeliveryAddress>> {
        let Some(address) = self.addresses.find_by_id(id).await? else {
            return Ok(Outcome::not_found::<DeliveryAddress>(Some(Action::Deleted)));
        };
        if !ctx.is_self_or_super_admin(address.user_id) {
            warn!(address_id = %id, "Delivery address deletion refused");
            return Ok(Outcome::forbidden::<DeliveryAddress>(Action::Deleted));
        }

        self.addresses.delete(id).await?;
        info!(address_id = %id, "Delivery address deleted");
        Ok(Outcome::done::<DeliveryAddress>(Action::Deleted))
    }

    async fn delete_addresses(
        &self,
        ctx: &RequestContext,
        ids: Vec<Uuid>,
    ) -> AppResult<Outcome<DeliveryAddress>> {
        let Some(restriction) = owned_rows(ctx) else {
            return Ok(Outcome::forbidden::<DeliveryAddress>(Action::Deleted));
        };

        let deleted = self.addresses.delete_many(ids, restriction).await?;
        info!(deleted, "Delivery addresses deleted");
        Ok(Outcome::counted::<DeliveryAddress>(Action::Deleted, deleted))
    }
}
