use catalog_core::{Money, ProductId};
use catalog_products::{NewProduct, Product, ProductError};

use super::{ProductUseCases, UseCaseError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProductRequest {
    /// Caller-chosen id; a fresh one is generated when absent.
    pub product_id: Option<ProductId>,
    pub name: String,
    pub description: String,
    pub category: String,
    pub base_price: Money,
}

impl CreateProductRequest {
    pub fn new(name: impl Into<String>, category: impl Into<String>, base_price: Money) -> Self {
        Self {
            product_id: None,
            name: name.into(),
            description: String::new(),
            category: category.into(),
            base_price,
        }
    }

    pub fn with_id(mut self, id: ProductId) -> Self {
        self.product_id = Some(id);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl ProductUseCases {
    pub async fn create_product(&self, request: CreateProductRequest) -> Result<Product, UseCaseError> {
        let id = match request.product_id {
            Some(id) => {
                if self.repository.exists(id).await? {
                    return Err(ProductError::AlreadyExists(id).into());
                }
                id
            }
            None => ProductId::new(),
        };

        let product = Product::create_with_id(
            id,
            NewProduct {
                name: request.name,
                description: request.description,
                category: request.category,
                base_price: request.base_price,
            },
            self.clock.now(),
        )?;

        let insert = self.repository.build_insert_op(&product)?;
        self.commit("create_product", &product, Some(insert)).await?;
        Ok(product)
    }
}
