//! Read-only product queries.
//!
//! Views are rebuilt from stored columns. Prices are re-derived here with the
//! same formula and window semantics as `Product::effective_price`.

pub mod in_memory;
pub mod postgres;
pub mod pricing;
pub mod query;
pub mod view;

pub use in_memory::InMemoryProductQueries;
pub use postgres::PostgresProductQueries;
pub use query::{Pagination, ProductFilter, ProductPage};
pub use view::{DiscountView, ProductView};

use chrono::{DateTime, Utc};
use thiserror::Error;

use catalog_core::{Classify, ErrorKind, ProductId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReadModelError {
    #[error("product not found: {0}")]
    NotFound(ProductId),

    #[error("stored product is invalid: {0}")]
    Corrupt(String),

    #[error("storage failure: {0}")]
    Storage(String),
}

impl Classify for ReadModelError {
    fn kind(&self) -> ErrorKind {
        match self {
            ReadModelError::NotFound(_) => ErrorKind::NotFound,
            ReadModelError::Corrupt(_) | ReadModelError::Storage(_) => ErrorKind::Infrastructure,
        }
    }
}

#[async_trait::async_trait]
pub trait ProductQueries: Send + Sync {
    /// The product as seen at `now`.
    async fn get_product(&self, id: ProductId, now: DateTime<Utc>) -> Result<ProductView, ReadModelError>;

    /// Products matching `filter`, newest first.
    async fn list_products(
        &self,
        filter: ProductFilter,
        pagination: Pagination,
        now: DateTime<Utc>,
    ) -> Result<ProductPage, ReadModelError>;
}
