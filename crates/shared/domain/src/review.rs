//! Store reviews and the filter tallies shown above review lists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::constants::{MAX_REVIEW_RATING, MIN_REVIEW_RATING, REVIEW_SUBJECTS};
use crate::error::{DomainError, DomainResult};
use crate::resource_kind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub store_id: Uuid,
    pub user_id: Uuid,
    pub subject: String,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

resource_kind!(Review, "review", "reviews", "Review", "review");

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateReview {
    pub subject: String,
    #[validate(range(min = 1, max = 5))]
    pub rating: i16,
    #[validate(length(max = 1000))]
    pub comment: Option<String>,
}

impl CreateReview {
    /// Subjects come from a fixed list
    pub fn ensure_known_subject(&self) -> DomainResult<()> {
        if REVIEW_SUBJECTS.contains(&self.subject.as_str()) {
            Ok(())
        } else {
            Err(DomainError::validation(format!(
                "The review subject must be one of: {}",
                REVIEW_SUBJECTS.join(", ")
            )))
        }
    }
}

/// Raw counts a store returns for the filter bar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewTally {
    pub total: u64,
    /// Reviews written by the caller
    pub mine: u64,
    pub by_subject: Vec<(String, u64)>,
    pub by_rating: Vec<(i16, u64)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewFilter {
    pub name: String,
    pub total: u64,
}

impl ReviewFilter {
    fn new(name: impl Into<String>, total: u64) -> Self {
        Self {
            name: name.into(),
            total,
        }
    }
}

/// "All", "Me", one entry per subject, then "5 stars" down to "1 star".
pub fn review_filters(tally: &ReviewTally) -> Vec<ReviewFilter> {
    let mut filters = vec![
        ReviewFilter::new("All", tally.total),
        ReviewFilter::new("Me", tally.mine),
    ];

    for subject in REVIEW_SUBJECTS {
        let total = tally
            .by_subject
            .iter()
            .find(|(name, _)| name == subject)
            .map_or(0, |(_, total)| *total);
        filters.push(ReviewFilter::new(capitalize(subject), total));
    }

    for rating in (MIN_REVIEW_RATING..=MAX_REVIEW_RATING).rev() {
        let total = tally
            .by_rating
            .iter()
            .find(|(stars, _)| *stars == rating)
            .map_or(0, |(_, total)| *total);
        let label = if rating == 1 { "star" } else { "stars" };
        filters.push(ReviewFilter::new(format!("{} {}", rating, label), total));
    }

    filters
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_cover_every_subject_and_rating() {
        let tally = ReviewTally {
            total: 7,
            mine: 2,
            by_subject: vec![("product".to_string(), 4), ("delivery".to_string(), 3)],
            by_rating: vec![(5, 5), (1, 2)],
        };

        let filters = review_filters(&tally);
        let names: Vec<_> = filters.iter().map(|f| f.name.as_str()).collect();

        assert_eq!(
            names,
            vec![
                "All",
                "Me",
                "Product",
                "Customer service",
                "Delivery",
                "Payment",
                "5 stars",
                "4 stars",
                "3 stars",
                "2 stars",
                "1 star"
            ]
        );
        assert_eq!(filters[0].total, 7);
        assert_eq!(filters[1].total, 2);
        assert_eq!(filters[2].total, 4);
        assert_eq!(filters[3].total, 0);
        assert_eq!(filters[6].total, 5);
        assert_eq!(filters[10].total, 2);
    }

    #[test]
    fn unknown_subject_is_rejected() {
        let review = CreateReview {
            subject: "parking".to_string(),
            rating: 4,
            comment: None,
        };
        assert!(review.ensure_known_subject().is_err());
    }
}
