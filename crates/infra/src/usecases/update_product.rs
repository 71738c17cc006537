use catalog_core::ProductId;
use catalog_products::{Product, ProductUpdate};

use super::{ProductUseCases, UseCaseError};

impl ProductUseCases {
    /// A no-op update commits nothing.
    pub async fn update_product(&self, id: ProductId, update: ProductUpdate) -> Result<Product, UseCaseError> {
        self.modify("update_product", id, |product, now| product.update(update, now))
            .await
    }
}
