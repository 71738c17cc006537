//! Read-side price derivation.
//!
//! Recomputed from stored columns rather than through the aggregate, using the
//! same formula (`base - base * pct / 100`) and the same inclusive window.

use chrono::{DateTime, Utc};

use catalog_core::{BigInt, BigRational, Money, Period};

/// A stored discount: exact percentage plus its window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDiscount {
    pub percentage: BigRational,
    pub period: Period,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceBreakdown {
    /// Amount taken off the base price; `None` when no discount applies at `now`.
    pub discount_amount: Option<Money>,
    pub effective_price: Money,
}

pub fn price_at(base_price: &Money, discount: Option<&StoredDiscount>, now: DateTime<Utc>) -> PriceBreakdown {
    match discount {
        Some(discount) if discount.period.contains(now) => {
            let fraction = &discount.percentage / BigRational::from_integer(BigInt::from(100));
            let amount = base_price.multiply(&fraction);
            PriceBreakdown {
                effective_price: base_price.subtract(&amount),
                discount_amount: Some(amount),
            }
        }
        _ => PriceBreakdown {
            discount_amount: None,
            effective_price: base_price.clone(),
        },
    }
}
