//! Pagination types for list operations.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Pagination query parameters (reusable across all list operations)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

fn default_page() -> u64 {
    DEFAULT_PAGE_NUMBER
}

fn default_per_page() -> u64 {
    DEFAULT_PAGE_SIZE
}

impl PaginationParams {
    pub fn new(page: u64, per_page: u64) -> Self {
        Self { page, per_page }
    }

    /// Zero-based page index for the database paginator
    pub fn page_index(&self) -> u64 {
        self.page.max(1) - 1
    }

    /// Get limit capped at maximum (never zero)
    pub fn limit(&self) -> u64 {
        self.per_page.clamp(1, MAX_PAGE_SIZE)
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE_NUMBER,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Paginated response wrapper
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationMeta {
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl<T> Paginated<T> {
    /// Create new paginated response
    pub fn new(data: Vec<T>, page: u64, per_page: u64, total: u64) -> Self {
        let total_pages = if per_page > 0 {
            total.div_ceil(per_page)
        } else {
            0
        };

        Self {
            data,
            meta: PaginationMeta {
                page,
                per_page,
                total,
                total_pages,
            },
        }
    }

    /// Convert every item, keeping the page metadata
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }

    /// Fallible [`Paginated::map`], stopping at the first error
    pub fn try_map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<Paginated<U>, E> {
        Ok(Paginated {
            data: self.data.into_iter().map(f).collect::<Result<_, _>>()?,
            meta: self.meta,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_is_capped_and_never_zero() {
        assert_eq!(PaginationParams::new(1, 500).limit(), MAX_PAGE_SIZE);
        assert_eq!(PaginationParams::new(1, 0).limit(), 1);
        assert_eq!(PaginationParams::new(0, 10).page_index(), 0);
        assert_eq!(PaginationParams::new(3, 10).page_index(), 2);
    }

    #[test]
    fn total_pages_rounds_up() {
        let page = Paginated::new(vec![1, 2], 1, 2, 5);
        assert_eq!(page.meta.total_pages, 3);
        assert_eq!(page.map(|n| n * 10).data, vec![10, 20]);
    }
}
