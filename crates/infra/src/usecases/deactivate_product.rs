use catalog_core::ProductId;
use catalog_products::Product;

use super::{ProductUseCases, UseCaseError};

impl ProductUseCases {
    pub async fn deactivate_product(&self, id: ProductId) -> Result<Product, UseCaseError> {
        self.modify("deactivate_product", id, |product, now| product.deactivate(now))
            .await
    }
}
