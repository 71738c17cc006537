//! Product domain events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use catalog_core::{Money, ProductId};
use catalog_events::Event;

/// The closed set of facts a product can record.
///
/// Serialized with an internal `type` tag, so an outbox consumer reads
/// `event.type` and the remaining fields from the same object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProductEvent {
    #[serde(rename = "product.created")]
    Created {
        product_id: ProductId,
        name: String,
        description: String,
        category: String,
        base_price: Money,
        occurred_at: DateTime<Utc>,
    },

    /// Only fields that actually changed are `Some`.
    #[serde(rename = "product.updated")]
    Updated {
        product_id: ProductId,
        name: Option<String>,
        description: Option<String>,
        category: Option<String>,
        occurred_at: DateTime<Utc>,
    },

    #[serde(rename = "product.activated")]
    Activated {
        product_id: ProductId,
        occurred_at: DateTime<Utc>,
    },

    #[serde(rename = "product.deactivated")]
    Deactivated {
        product_id: ProductId,
        occurred_at: DateTime<Utc>,
    },

    #[serde(rename = "discount.applied")]
    DiscountApplied {
        product_id: ProductId,
        /// Decimal text, e.g. `"12.5"`.
        percentage: String,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        occurred_at: DateTime<Utc>,
    },

    #[serde(rename = "discount.removed")]
    DiscountRemoved {
        product_id: ProductId,
        occurred_at: DateTime<Utc>,
    },
}

impl ProductEvent {
    pub fn product_id(&self) -> ProductId {
        match self {
            ProductEvent::Created { product_id, .. }
            | ProductEvent::Updated { product_id, .. }
            | ProductEvent::Activated { product_id, .. }
            | ProductEvent::Deactivated { product_id, .. }
            | ProductEvent::DiscountApplied { product_id, .. }
            | ProductEvent::DiscountRemoved { product_id, .. } => *product_id,
        }
    }
}

impl Event for ProductEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ProductEvent::Created { .. } => "product.created",
            ProductEvent::Updated { .. } => "product.updated",
            ProductEvent::Activated { .. } => "product.activated",
            ProductEvent::Deactivated { .. } => "product.deactivated",
            ProductEvent::DiscountApplied { .. } => "discount.applied",
            ProductEvent::DiscountRemoved { .. } => "discount.removed",
        }
    }

    fn aggregate_id(&self) -> String {
        self.product_id().to_string()
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ProductEvent::Created { occurred_at, .. }
            | ProductEvent::Updated { occurred_at, .. }
            | ProductEvent::Activated { occurred_at, .. }
            | ProductEvent::Deactivated { occurred_at, .. }
            | ProductEvent::DiscountApplied { occurred_at, .. }
            | ProductEvent::DiscountRemoved { occurred_at, .. } => *occurred_at,
        }
    }
}
