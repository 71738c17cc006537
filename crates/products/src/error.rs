//! Product domain errors.

use core::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;

use catalog_core::{Classify, ErrorKind, Money, ProductId};

use crate::product::ProductStatus;

/// Why a discount window was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodProblem {
    /// No percentage was supplied at all.
    MissingPercentage,
    /// `start >= end`.
    StartNotBeforeEnd {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    /// The window does not contain the instant the discount was applied at.
    NotValidAt {
        at: DateTime<Utc>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl fmt::Display for PeriodProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodProblem::MissingPercentage => f.write_str("percentage is required"),
            PeriodProblem::StartNotBeforeEnd { start, end } => {
                write!(f, "start {start} is not before end {end}")
            }
            PeriodProblem::NotValidAt { at, start, end } => {
                write!(f, "{at} is outside [{start}, {end}]")
            }
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProductError {
    #[error("product not found: {0}")]
    NotFound(ProductId),

    #[error("product already exists: {0}")]
    AlreadyExists(ProductId),

    #[error("invalid product name: must not be empty")]
    InvalidProductName,

    #[error("invalid product price {price}: must be greater than zero")]
    InvalidProductPrice { price: Money },

    #[error("product {id} is archived")]
    ProductArchived { id: ProductId },

    #[error("product {id} is not active (status: {status})")]
    ProductNotActive { id: ProductId, status: ProductStatus },

    #[error("product {id} is already active")]
    ProductAlreadyActive { id: ProductId },

    #[error("product {id} is already inactive")]
    ProductAlreadyInactive { id: ProductId },

    #[error("discount already exists for product {id}")]
    DiscountAlreadyExists { id: ProductId },

    #[error("no discount to remove from product {id}")]
    NoDiscountToRemove { id: ProductId },

    #[error("invalid discount period: {0}")]
    InvalidDiscountPeriod(PeriodProblem),

    #[error("discount percentage must be between 0 and 100, got {value}")]
    InvalidPercentage { value: String },
}

impl Classify for ProductError {
    fn kind(&self) -> ErrorKind {
        match self {
            ProductError::NotFound(_) => ErrorKind::NotFound,
            ProductError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            ProductError::InvalidProductName
            | ProductError::InvalidProductPrice { .. } => ErrorKind::InvalidInput,
            ProductError::ProductArchived { .. }
            | ProductError::ProductNotActive { .. }
            | ProductError::ProductAlreadyActive { .. }
            | ProductError::ProductAlreadyInactive { .. }
            | ProductError::DiscountAlreadyExists { .. }
            | ProductError::NoDiscountToRemove { .. } => ErrorKind::InvalidState,
            ProductError::InvalidDiscountPeriod(_) | ProductError::InvalidPercentage { .. } => {
                ErrorKind::InvalidDiscount
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_the_taxonomy() {
        let id = ProductId::new();
        assert_eq!(ProductError::NotFound(id).kind(), ErrorKind::NotFound);
        assert_eq!(ProductError::InvalidProductName.kind(), ErrorKind::InvalidInput);
        assert_eq!(
            ProductError::ProductNotActive { id, status: ProductStatus::Inactive }.kind(),
            ErrorKind::InvalidState
        );
        assert_eq!(
            ProductError::InvalidDiscountPeriod(PeriodProblem::MissingPercentage).kind(),
            ErrorKind::InvalidDiscount
        );
    }

    #[test]
    fn messages_carry_context() {
        let id = ProductId::new();
        let err = ProductError::ProductNotActive { id, status: ProductStatus::Archived };
        assert_eq!(err.to_string(), format!("product {id} is not active (status: archived)"));
    }
}
