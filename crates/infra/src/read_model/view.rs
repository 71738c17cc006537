use chrono::{DateTime, Utc};
use serde::Serialize;

use catalog_core::money::{format_rational, parse_rational};
use catalog_core::{Money, Period, ProductId};
use catalog_products::ProductStatus;

use super::ReadModelError;
use super::pricing::{StoredDiscount, price_at};
use crate::repository::ProductRow;

/// Presentational view of a product at a given instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub base_price: Money,
    pub discount: Option<DiscountView>,
    /// Amount saved at the view instant, if a discount applies.
    pub discount_amount: Option<Money>,
    pub effective_price: Money,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub archived_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscountView {
    /// Exact rational text, e.g. `"25/2"`.
    pub percentage: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// Whether the window contains the view instant.
    pub active: bool,
}

impl ProductView {
    pub fn from_row(row: ProductRow, now: DateTime<Utc>) -> Result<Self, ReadModelError> {
        let base_price = Money::new(row.base_price_numerator, row.base_price_denominator)
            .map_err(|e| ReadModelError::Corrupt(format!("base price: {e}")))?;
        let status = row
            .status
            .parse::<ProductStatus>()
            .map_err(|e| ReadModelError::Corrupt(e.to_string()))?;

        let discount = match (row.discount_percent, row.discount_start_date, row.discount_end_date) {
            (Some(percent), Some(start), Some(end)) => Some(StoredDiscount {
                percentage: parse_rational(&percent)
                    .map_err(|e| ReadModelError::Corrupt(format!("discount percent: {e}")))?,
                period: Period::new(start, end)
                    .map_err(|e| ReadModelError::Corrupt(format!("discount window: {e}")))?,
            }),
            (None, None, None) => None,
            _ => {
                return Err(ReadModelError::Corrupt(
                    "discount columns must be all set or all null".to_string(),
                ));
            }
        };

        let price = price_at(&base_price, discount.as_ref(), now);
        let discount = discount.map(|d| DiscountView {
            percentage: format_rational(&d.percentage),
            start_date: d.period.start(),
            end_date: d.period.end(),
            active: d.period.contains(now),
        });

        Ok(Self {
            id: ProductId::from_uuid(row.product_id),
            name: row.name,
            description: row.description,
            category: row.category,
            base_price,
            discount,
            discount_amount: price.discount_amount,
            effective_price: price.effective_price,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
            archived_at: row.archived_at,
        })
    }
}
