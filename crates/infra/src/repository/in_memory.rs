use std::sync::Arc;

use catalog_core::ProductId;
use catalog_products::Product;

use super::mapping::{ProductMapper, ProductRow};
use super::{ProductRepository, RepositoryError};
use crate::commit::{InMemoryStore, Table};

/// Repository over the shared `InMemoryStore`. Intended for tests/dev.
#[derive(Debug, Clone)]
pub struct InMemoryProductRepository {
    store: Arc<InMemoryStore>,
    mapper: ProductMapper,
}

impl InMemoryProductRepository {
    pub fn new(store: Arc<InMemoryStore>, mapper: ProductMapper) -> Self {
        Self { store, mapper }
    }
}

#[async_trait::async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn load(&self, id: ProductId) -> Result<Product, RepositoryError> {
        let row = self
            .store
            .row(Table::Products, &id.to_string())
            .map_err(|e| RepositoryError::Storage(e.to_string()))?
            .ok_or(RepositoryError::NotFound(id))?;
        let snapshot = ProductRow::from_stored(&row)?.into_snapshot()?;
        Ok(Product::rebuild(snapshot))
    }

    async fn exists(&self, id: ProductId) -> Result<bool, RepositoryError> {
        self.store
            .row(Table::Products, &id.to_string())
            .map(|row| row.is_some())
            .map_err(|e| RepositoryError::Storage(e.to_string()))
    }

    fn mapper(&self) -> &ProductMapper {
        &self.mapper
    }
}
