//! Query values threaded through list operations.
//!
//! A [`ResourceQuery`] is a plain value: callers build it, repositories
//! complete it with their default scope, and stores translate it into SQL.
//! Nothing about the "current query" lives on a repository instance.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::owner::OwnerRef;
use crate::pagination::{Paginated, PaginationParams};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    LatestFirst,
    OldestFirst,
}

/// The subset of rows a scope may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Restriction {
    Everything,
    Store(Uuid),
    User(Uuid),
    Owner(OwnerRef),
}

/// Filtered and ordered view over one entity's table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scope {
    pub restriction: Restriction,
    pub order: SortOrder,
}

impl Scope {
    /// Newest rows first, limited to `restriction`
    pub fn latest(restriction: Restriction) -> Self {
        Self {
            restriction,
            order: SortOrder::LatestFirst,
        }
    }

    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }
}

/// Caller-supplied narrowing applied on top of the scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FilterParams {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub start_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_at: Option<DateTime<Utc>>,
}

impl FilterParams {
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            ..Self::default()
        }
    }

    pub fn between(start_at: DateTime<Utc>, end_at: DateTime<Utc>) -> Self {
        Self {
            start_at: Some(start_at),
            end_at: Some(end_at),
            ..Self::default()
        }
    }

    /// Trimmed search term, `None` when blank
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }

    pub fn validate(&self) -> DomainResult<()> {
        match (self.start_at, self.end_at) {
            (Some(start), Some(end)) if start > end => Err(DomainError::validation(
                "The start date must be before the end date",
            )),
            _ => Ok(()),
        }
    }
}

/// Relationship names requested for eager loading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Includes(BTreeSet<String>);

impl Includes {
    pub fn wants(&self, relation: &str) -> bool {
        self.0.contains(relation)
    }

    pub fn insert(&mut self, relation: impl Into<String>) {
        self.0.insert(relation.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Includes {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceQuery {
    scope: Option<Scope>,
    pub filters: FilterParams,
    pub page: PaginationParams,
    pub count_only: bool,
    pub includes: Includes,
}

impl ResourceQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the scope outright
    pub fn set_scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// `None` until a caller or repository initializes it
    pub fn scope(&self) -> Option<&Scope> {
        self.scope.as_ref()
    }

    /// Initialize the scope only when none was set yet.
    pub fn scoped_or(mut self, default: impl FnOnce() -> Scope) -> Self {
        if self.scope.is_none() {
            self.scope = Some(default());
        }
        self
    }

    pub fn with_filters(mut self, filters: FilterParams) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_page(mut self, page: PaginationParams) -> Self {
        self.page = page;
        self
    }

    /// Ask for a total instead of a page
    pub fn counting(mut self) -> Self {
        self.count_only = true;
        self
    }

    pub fn including(mut self, relation: impl Into<String>) -> Self {
        self.includes.insert(relation);
        self
    }
}

/// Terminal read result: a page of resources or a bare count.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Page(Paginated<T>),
    Count { total: u64 },
}

impl<T> Listing<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Listing<U> {
        match self {
            Listing::Page(page) => Listing::Page(page.map(f)),
            Listing::Count { total } => Listing::Count { total },
        }
    }

    pub fn try_map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<Listing<U>, E> {
        Ok(match self {
            Listing::Page(page) => Listing::Page(page.try_map(f)?),
            Listing::Count { total } => Listing::Count { total },
        })
    }

    pub fn total(&self) -> u64 {
        match self {
            Listing::Page(page) => page.meta.total,
            Listing::Count { total } => *total,
        }
    }

    pub fn items(&self) -> &[T] {
        match self {
            Listing::Page(page) => &page.data,
            Listing::Count { .. } => &[],
        }
    }
}
