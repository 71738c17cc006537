use catalog_core::ProductId;
use catalog_products::Product;

use super::{ProductUseCases, UseCaseError};

impl ProductUseCases {
    pub async fn activate_product(&self, id: ProductId) -> Result<Product, UseCaseError> {
        self.modify("activate_product", id, |product, now| product.activate(now))
            .await
    }
}
