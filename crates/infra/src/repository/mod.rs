//! Product persistence: loading aggregates and translating them into operations.

pub mod in_memory;
pub mod mapping;
pub mod postgres;

pub use in_memory::InMemoryProductRepository;
pub use mapping::{ConcurrencyMode, ProductMapper, ProductRow};
pub use postgres::PostgresProductRepository;

use thiserror::Error;

use catalog_core::{Classify, ErrorKind, ProductId};
use catalog_products::Product;

use crate::commit::Operation;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("product not found: {0}")]
    NotFound(ProductId),

    /// The price cannot be stored as a 64-bit numerator/denominator pair.
    #[error("price {price} does not fit the stored representation")]
    PriceOutOfRange { price: String },

    #[error("stored product has invalid {column}: {reason}")]
    Corrupt { column: &'static str, reason: String },

    #[error("storage failure: {0}")]
    Storage(String),
}

impl Classify for RepositoryError {
    fn kind(&self) -> ErrorKind {
        match self {
            RepositoryError::NotFound(_) => ErrorKind::NotFound,
            RepositoryError::PriceOutOfRange { .. } => ErrorKind::InvalidInput,
            RepositoryError::Corrupt { .. } | RepositoryError::Storage(_) => {
                ErrorKind::Infrastructure
            }
        }
    }
}

/// Product repository.
///
/// Loading suspends on storage; building operations is pure and never
/// touches storage. Callers add the returned operations to a `CommitPlan`.
#[async_trait::async_trait]
pub trait ProductRepository: Send + Sync {
    /// Rebuild a product from storage, with no events and no dirty fields.
    async fn load(&self, id: ProductId) -> Result<Product, RepositoryError>;

    async fn exists(&self, id: ProductId) -> Result<bool, RepositoryError>;

    fn mapper(&self) -> &ProductMapper;

    fn build_insert_op(&self, product: &Product) -> Result<Operation, RepositoryError> {
        self.mapper().insert_op(product)
    }

    /// `None` when the product has no dirty fields.
    fn build_update_op(&self, product: &Product) -> Result<Option<Operation>, RepositoryError> {
        self.mapper().update_op(product)
    }
}
