use chrono::{DateTime, Utc};

use catalog_core::{BigRational, ProductId};
use catalog_products::{Discount, Product, ProductError};

use super::{ProductUseCases, UseCaseError};

/// Raw discount input. The percentage is optional so that a missing value is
/// reported as a domain error rather than a deserialization failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyDiscountRequest {
    pub percentage: Option<BigRational>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl ApplyDiscountRequest {
    pub fn new(percentage: BigRational, start_date: DateTime<Utc>, end_date: DateTime<Utc>) -> Self {
        Self {
            percentage: Some(percentage),
            start_date,
            end_date,
        }
    }

    pub fn into_discount(self) -> Result<Discount, ProductError> {
        Discount::new(self.percentage, self.start_date, self.end_date)
    }
}

impl ProductUseCases {
    /// The product is loaded before the discount is validated, so an unknown
    /// id reports `NotFound` even when the discount itself is malformed.
    pub async fn apply_discount(
        &self,
        id: ProductId,
        request: ApplyDiscountRequest,
    ) -> Result<Product, UseCaseError> {
        self.modify("apply_discount", id, move |product, now| {
            product.apply_discount(request.into_discount()?, now)
        })
        .await
    }
}
