use catalog_core::ProductId;
use catalog_products::Product;

use super::{ProductUseCases, UseCaseError};

impl ProductUseCases {
    pub async fn remove_discount(&self, id: ProductId) -> Result<Product, UseCaseError> {
        self.modify("remove_discount", id, |product, now| product.remove_discount(now))
            .await
    }
}
