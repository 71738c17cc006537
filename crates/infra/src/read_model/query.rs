//! Filtering and pagination for product listings.

use serde::{Deserialize, Serialize};

use catalog_products::ProductStatus;

use super::view::ProductView;

pub const DEFAULT_LIMIT: u32 = 50;
pub const MAX_LIMIT: u32 = 1000;

/// Pagination parameters for product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Maximum number of products to return.
    pub limit: u32,
    /// Offset for pagination (0-based).
    pub offset: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl Pagination {
    pub fn new(limit: Option<u32>, offset: Option<u32>) -> Self {
        Self {
            limit: limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT),
            offset: offset.unwrap_or(0),
        }
    }
}

/// Filter criteria for product listings. `None` matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub status: Option<ProductStatus>,
}

impl ProductFilter {
    pub fn matches(&self, category: &str, status: ProductStatus) -> bool {
        self.category.as_deref().is_none_or(|c| c == category)
            && self.status.is_none_or(|s| s == status)
    }
}

/// One page of products, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductPage {
    pub items: Vec<ProductView>,
    /// Number of products matching the filter, across all pages.
    pub total: u64,
    pub pagination: Pagination,
    pub has_more: bool,
}

impl ProductPage {
    pub fn new(items: Vec<ProductView>, total: u64, pagination: Pagination) -> Self {
        let has_more = total > u64::from(pagination.offset) + u64::from(pagination.limit);
        Self {
            items,
            total,
            pagination,
            has_more,
        }
    }
}
