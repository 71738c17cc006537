//! Discount value objects.

use chrono::{DateTime, Utc};

use catalog_core::money::{format_rational, to_exact_decimal, to_rounded_decimal};
use catalog_core::{BigInt, BigRational, Money, Period};

use crate::error::{PeriodProblem, ProductError};

/// Fallback scale for percentages that have no terminating decimal form.
const NON_TERMINATING_SCALE: u32 = 4;

/// A discount percentage in `[0, 100]`, kept as an exact rational.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Percentage(BigRational);

impl Percentage {
    pub fn new(value: BigRational) -> Result<Self, ProductError> {
        let hundred = BigRational::from_integer(BigInt::from(100));
        if value < BigRational::from_integer(BigInt::from(0)) || value > hundred {
            return Err(ProductError::InvalidPercentage {
                value: format_rational(&value),
            });
        }
        Ok(Self(value))
    }

    pub fn as_ratio(&self) -> &BigRational {
        &self.0
    }

    /// `percentage / 100`.
    pub fn as_fraction(&self) -> BigRational {
        &self.0 / BigRational::from_integer(BigInt::from(100))
    }

    /// Decimal text for event payloads: exact when the value terminates in
    /// base 10, otherwise rounded to four places.
    pub fn to_decimal_string(&self) -> String {
        to_exact_decimal(&self.0).unwrap_or_else(|| to_rounded_decimal(&self.0, NON_TERMINATING_SCALE))
    }
}

/// A percentage discount over a closed validity window.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Discount {
    percentage: Percentage,
    period: Period,
}

impl Discount {
    /// Validation order: presence of the percentage, its range, then the window.
    pub fn new(
        percentage: Option<BigRational>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Self, ProductError> {
        let percentage = percentage
            .ok_or(ProductError::InvalidDiscountPeriod(PeriodProblem::MissingPercentage))?;
        let percentage = Percentage::new(percentage)?;
        let period = Period::new(start, end).map_err(|e| {
            ProductError::InvalidDiscountPeriod(PeriodProblem::StartNotBeforeEnd {
                start: e.start,
                end: e.end,
            })
        })?;
        Ok(Self { percentage, period })
    }

    pub fn percentage(&self) -> &Percentage {
        &self.percentage
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.period.start()
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.period.end()
    }

    /// Inclusive on both ends.
    pub fn is_valid_at(&self, at: DateTime<Utc>) -> bool {
        self.period.contains(at)
    }

    /// `price - price * percentage / 100`, exact.
    pub fn calculate_discounted_price(&self, price: &Money) -> Money {
        let reduction = price.multiply(&self.percentage.as_fraction());
        price.subtract(&reduction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 18, 12, 0, 0).unwrap()
    }

    fn pct(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    #[test]
    fn twenty_five_percent_off_one_hundred_is_exactly_seventy_five() {
        let discount = Discount::new(Some(pct(25, 1)), t0(), t0() + Duration::hours(1)).unwrap();
        let price = Money::from_integer(100);
        assert_eq!(discount.calculate_discounted_price(&price), Money::from_integer(75));
    }

    #[test]
    fn fractional_percentages_stay_exact() {
        let discount = Discount::new(Some(pct(100, 3)), t0(), t0() + Duration::hours(1)).unwrap();
        let price = Money::from_integer(30);
        assert_eq!(discount.calculate_discounted_price(&price), Money::from_integer(20));
    }

    #[test]
    fn boundaries_of_the_percentage_range_are_allowed() {
        let end = t0() + Duration::days(1);
        assert!(Discount::new(Some(pct(0, 1)), t0(), end).is_ok());
        assert!(Discount::new(Some(pct(100, 1)), t0(), end).is_ok());
    }

    #[test]
    fn out_of_range_percentage_is_rejected() {
        let end = t0() + Duration::days(1);
        let err = Discount::new(Some(pct(201, 2)), t0(), end).unwrap_err();
        assert_eq!(err, ProductError::InvalidPercentage { value: "201/2".to_string() });
        assert!(matches!(
            Discount::new(Some(pct(-1, 1)), t0(), end),
            Err(ProductError::InvalidPercentage { .. })
        ));
    }

    #[test]
    fn missing_percentage_is_a_period_error() {
        let err = Discount::new(None, t0(), t0() + Duration::days(1)).unwrap_err();
        assert_eq!(err, ProductError::InvalidDiscountPeriod(PeriodProblem::MissingPercentage));
    }

    #[test]
    fn start_must_precede_end() {
        assert!(matches!(
            Discount::new(Some(pct(10, 1)), t0(), t0()),
            Err(ProductError::InvalidDiscountPeriod(PeriodProblem::StartNotBeforeEnd { .. }))
        ));
    }

    #[test]
    fn validity_is_inclusive_at_both_ends() {
        let end = t0() + Duration::hours(2);
        let discount = Discount::new(Some(pct(10, 1)), t0(), end).unwrap();
        assert!(discount.is_valid_at(t0()));
        assert!(discount.is_valid_at(end));
        assert!(!discount.is_valid_at(end + Duration::seconds(1)));
        assert!(!discount.is_valid_at(t0() - Duration::seconds(1)));
    }

    #[test]
    fn decimal_rendering_for_events() {
        let end = t0() + Duration::hours(1);
        let exact = Discount::new(Some(pct(25, 2)), t0(), end).unwrap();
        assert_eq!(exact.percentage().to_decimal_string(), "12.5");

        let repeating = Discount::new(Some(pct(100, 3)), t0(), end).unwrap();
        assert_eq!(repeating.percentage().to_decimal_string(), "33.3333");
    }
}
