//! Deterministic pagination over an already-fetched result set.

use serde::Serialize;

use crate::error::OrderError;

/// Validated pagination parameters, both ≥ 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub const DEFAULT_PAGE: u32 = 1;
    pub const DEFAULT_PAGE_SIZE: u32 = 10;

    /// Resolves optional caller parameters, defaulting to page 1 of 10.
    ///
    /// Zero is rejected here so the engine itself can assume validated
    /// positive integers.
    pub fn resolve(page: Option<u32>, page_size: Option<u32>) -> Result<Self, OrderError> {
        let page = page.unwrap_or(Self::DEFAULT_PAGE);
        let page_size = page_size.unwrap_or(Self::DEFAULT_PAGE_SIZE);
        if page < 1 {
            return Err(OrderError::Validation("page must be >= 1".to_string()));
        }
        if page_size < 1 {
            return Err(OrderError::Validation("pageSize must be >= 1".to_string()));
        }
        Ok(Self { page, page_size })
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: Self::DEFAULT_PAGE,
            page_size: Self::DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of an ordered result set plus the total page count over the
/// whole set. Derived, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total_pages: u32,
}

/// Slices `items` into the requested page.
///
/// `total_pages` is computed over the full set (0 for an empty set); a
/// page beyond the end yields an empty slice, not an error.
pub fn paginate<T>(items: Vec<T>, request: PageRequest) -> Paged<T> {
    let total = items.len();
    let page_size = request.page_size as usize;
    let total_pages = total.div_ceil(page_size) as u32;

    let start = (request.page as usize - 1) * page_size;
    let items = if start >= total {
        Vec::new()
    } else {
        items
            .into_iter()
            .skip(start)
            .take(page_size)
            .collect()
    };

    Paged { items, total_pages }
}
