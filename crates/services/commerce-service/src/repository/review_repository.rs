//! Review data access.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, Set,
};
use uuid::Uuid;

use super::base::{fetch_listing, scoped_select, ScopedEntity};
use super::entities::review::{self, ActiveModel, Entity as ReviewEntity};
use common::AppResult;
use domain::{
    CreateReview, Listing, ResourceQuery, Restriction, Review, ReviewTally, MAX_REVIEW_RATING,
    MIN_REVIEW_RATING, REVIEW_SUBJECTS,
};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

impl ScopedEntity for ReviewEntity {
    fn id_column() -> review::Column {
        review::Column::Id
    }

    fn created_at_column() -> review::Column {
        review::Column::CreatedAt
    }

    fn search_columns() -> Vec<review::Column> {
        vec![review::Column::Subject, review::Column::Comment]
    }

    fn restrict(restriction: &Restriction) -> Option<Condition> {
        match restriction {
            Restriction::Everything => Some(Condition::all()),
            Restriction::Store(store_id) => {
                Some(Condition::all().add(review::Column::StoreId.eq(*store_id)))
            }
            Restriction::User(user_id) => {
                Some(Condition::all().add(review::Column::UserId.eq(*user_id)))
            }
            Restriction::Owner(_) => None,
        }
    }
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn list(&self, query: &ResourceQuery) -> AppResult<Listing<Review>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Review>>;

    async fn create(&self, store_id: Uuid, user_id: Uuid, input: CreateReview)
        -> AppResult<Review>;

    async fn delete(&self, id: Uuid) -> AppResult<u64>;

    /// Review counts of a store, split by subject and by rating
    async fn tally(&self, store_id: Uuid, user_id: Option<Uuid>) -> AppResult<ReviewTally>;
}

pub struct ReviewStore {
    db: DatabaseConnection,
}

impl ReviewStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn count_where(&self, store_id: Uuid, condition: Condition) -> AppResult<u64> {
        let total = ReviewEntity::find()
            .filter(review::Column::StoreId.eq(store_id))
            .filter(condition)
            .count(&self.db)
            .await?;
        Ok(total)
    }
}

#[async_trait]
impl ReviewRepository for ReviewStore {
    async fn list(&self, query: &ResourceQuery) -> AppResult<Listing<Review>> {
        let select = scoped_select::<ReviewEntity>(query)?;
        let listing = fetch_listing(&self.db, select, query).await?;
        Ok(listing.map(Review::from))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Review>> {
        let result = ReviewEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Review::from))
    }

    async fn create(
        &self,
        store_id: Uuid,
        user_id: Uuid,
        input: CreateReview,
    ) -> AppResult<Review> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            store_id: Set(store_id),
            user_id: Set(user_id),
            subject: Set(input.subject),
            rating: Set(input.rating),
            comment: Set(input.comment),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await?;
        Ok(Review::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<u64> {
        let result = ReviewEntity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected)
    }

    async fn tally(&self, store_id: Uuid, user_id: Option<Uuid>) -> AppResult<ReviewTally> {
        let total = self.count_where(store_id, Condition::all()).await?;
        let mine = match user_id {
            Some(user_id) => {
                self.count_where(store_id, Condition::all().add(review::Column::UserId.eq(user_id)))
                    .await?
            }
            None => 0,
        };

        let mut by_subject = Vec::with_capacity(REVIEW_SUBJECTS.len());
        for subject in REVIEW_SUBJECTS {
            let count = self
                .count_where(store_id, Condition::all().add(review::Column::Subject.eq(*subject)))
                .await?;
            by_subject.push((subject.to_string(), count));
        }

        let mut by_rating = Vec::new();
        for rating in (MIN_REVIEW_RATING..=MAX_REVIEW_RATING).rev() {
            let count = self
                .count_where(store_id, Condition::all().add(review::Column::Rating.eq(rating)))
                .await?;
            by_rating.push((rating, count));
        }

        Ok(ReviewTally {
            total,
            mine,
            by_subject,
            by_rating,
        })
    }
}
