//! Store reviews and the filter bar built from their counts.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::access::{manages_store, scope_permitted};
use crate::repository::{ReviewRepository, StoreRepository};
use common::AppResult;
use domain::{
    review_filters, validate_input, Action, CreateReview, Listing, Outcome, RequestContext,
    ResourceQuery, Restriction, Review, ReviewFilter, Scope, Store,
};

#[async_trait]
pub trait ReviewService: Send + Sync {
    /// Reviews are public once the store exists
    async fn list_reviews(
        &self,
        ctx: &RequestContext,
        store_id: Uuid,
        query: ResourceQuery,
    ) -> AppResult<Outcome<Listing<Review>>>;

    async fn create_review(
        &self,
        ctx: &RequestContext,
        store_id: Uuid,
        input: CreateReview,
    ) -> AppResult<Outcome<Review>>;

    /// Authors remove their own reviews; store managers moderate
    async fn delete_review(&self, ctx: &RequestContext, id: Uuid) -> AppResult<Outcome<Review>>;

    async fn review_filters(
        &self,
        ctx: &RequestContext,
        store_id: Uuid,
    ) -> AppResult<Outcome<Vec<ReviewFilter>>>;
}

pub struct ReviewManager {
    reviews: Arc<dyn ReviewRepository>,
    stores: Arc<dyn StoreRepository>,
}

impl ReviewManager {
    pub fn new(reviews: Arc<dyn ReviewRepository>, stores: Arc<dyn StoreRepository>) -> Self {
        Self { reviews, stores }
    }

    async fn store_exists(&self, store_id: Uuid) -> AppResult<bool> {
        Ok(self.stores.find_by_id(store_id).await?.is_some())
    }
}

#[async_trait]
impl ReviewService for ReviewManager {
    async fn list_reviews(
        &self,
        ctx: &RequestContext,
        store_id: Uuid,
        query: ResourceQuery,
    ) -> AppResult<Outcome<Listing<Review>>> {
        if !self.store_exists(store_id).await? {
            return Ok(Outcome::not_found::<Store>(None));
        }
        // Public listing, but only super admins may look past this store
        if !scope_permitted(ctx, &query, Restriction::Store(store_id)) {
            return Ok(Outcome::forbidden::<Review>(Action::Viewed));
        }

        let query = query.scoped_or(|| Scope::latest(Restriction::Store(store_id)));
        Ok(Outcome::Found(self.reviews.list(&query).await?))
    }

    async fn create_review(
        &self,
        ctx: &RequestContext,
        store_id: Uuid,
        input: CreateReview,
    ) -> AppResult<Outcome<Review>> {
        let Some(user_id) = ctx.user_id() else {
            return Ok(Outcome::forbidden::<Review>(Action::Created));
        };
        if !self.store_exists(store_id).await? {
            return Ok(Outcome::not_found::<Store>(Some(Action::Created)));
        }
        validate_input(&input)?;
        input.ensure_known_subject()?;

        let review = self.reviews.create(store_id, user_id, input).await?;
        info!(
            review_id = %review.id,
            store_id = %store_id,
            rating = review.rating,
            "Review created"
        );
        Ok(Outcome::show_created(review))
    }

    async fn delete_review(&self, ctx: &RequestContext, id: Uuid) -> AppResult<Outcome<Review>> {
        let Some(review) = self.reviews.find_by_id(id).await? else {
            return Ok(Outcome::not_found::<Review>(Some(Action::Deleted)));
        };
        let permitted = ctx.is(review.user_id)
            || manages_store(ctx, self.stores.as_ref(), review.store_id).await?;
        if !permitted {
            warn!(review_id = %id, "Review deletion refused");
            return Ok(Outcome::forbidden::<Review>(Action::Deleted));
        }

        self.reviews.delete(id).await?;
        info!(review_id = %id, "Review deleted");
        Ok(Outcome::done::<Review>(Action::Deleted))
    }

    async fn review_filters(
        &self,
        ctx: &RequestContext,
        store_id: Uuid,
    ) -> AppResult<Outcome<Vec<ReviewFilter>>> {
        if !self.store_exists(store_id).await? {
            return Ok(Outcome::not_found::<Store>(None));
        }

        let tally = self.reviews.tally(store_id, ctx.user_id()).await?;
        Ok(Outcome::Found(review_filters(&tally)))
    }
}
