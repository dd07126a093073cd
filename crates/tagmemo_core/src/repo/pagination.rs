//! Offset-limited result windows.
//!
//! # Invariants
//! - `page` and `items_per_page` are both `>= 1` once constructed.
//! - `offset = (page - 1) * items_per_page`.
//! - A window past the end is an empty page, never an error.

use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_ITEMS_PER_PAGE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PaginationError {
    #[error("page must be >= 1")]
    InvalidPage,
    #[error("items_per_page must be >= 1")]
    InvalidItemsPerPage,
}

/// 1-based page request. Only constructible through `new` or `default`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u32,
    items_per_page: u32,
}

impl Pagination {
    pub fn new(page: u32, items_per_page: u32) -> Result<Self, PaginationError> {
        if page == 0 {
            return Err(PaginationError::InvalidPage);
        }
        if items_per_page == 0 {
            return Err(PaginationError::InvalidItemsPerPage);
        }
        Ok(Self {
            page,
            items_per_page,
        })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn items_per_page(&self) -> u32 {
        self.items_per_page
    }

    /// Rows skipped before this page. Saturates instead of overflowing.
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1).saturating_mul(i64::from(self.items_per_page))
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.items_per_page)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
        }
    }
}

/// One page of rows plus the unpaginated total for the same filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult<T> {
    pub total_count: u64,
    pub items: Vec<T>,
}

impl<T> PageResult<T> {
    pub fn empty() -> Self {
        Self {
            total_count: 0,
            items: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Pagination, PaginationError};

    #[test]
    fn offset_is_zero_based_from_one_based_page() {
        let first = Pagination::new(1, 20).unwrap();
        assert_eq!(first.offset(), 0);
        assert_eq!(first.limit(), 20);

        let third = Pagination::new(3, 20).unwrap();
        assert_eq!(third.offset(), 40);
    }

    #[test]
    fn zero_values_are_rejected() {
        assert_eq!(Pagination::new(0, 10), Err(PaginationError::InvalidPage));
        assert_eq!(
            Pagination::new(1, 0),
            Err(PaginationError::InvalidItemsPerPage)
        );
    }

    #[test]
    fn default_is_first_page_of_ten() {
        let page = Pagination::default();
        assert_eq!((page.page(), page.items_per_page()), (1, 10));
    }

    #[test]
    fn large_pages_do_not_overflow() {
        let page = Pagination::new(u32::MAX, u32::MAX).unwrap();
        assert!(page.offset() > 0);
    }
}
