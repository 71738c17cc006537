use core::fmt;
use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use catalog_core::{AggregateRoot, Money, ProductId};

use crate::change_tracker::{ChangeTracker, Field};
use crate::discount::Discount;
use crate::error::{PeriodProblem, ProductError};
use crate::events::ProductEvent;

/// Category assigned when a product is created without one.
pub const DEFAULT_CATEGORY: &str = "uncategorized";

/// Product status lifecycle: `inactive <-> active`, either `-> archived` (terminal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Inactive,
    Active,
    Archived,
}

impl ProductStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProductStatus::Inactive => "inactive",
            ProductStatus::Active => "active",
            ProductStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown product status '{0}'")]
pub struct ParseStatusError(pub String);

impl FromStr for ProductStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inactive" => Ok(ProductStatus::Inactive),
            "active" => Ok(ProductStatus::Active),
            "archived" => Ok(ProductStatus::Archived),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

/// Input for `Product::create`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub category: String,
    pub base_price: Money,
}

/// Partial update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
}

impl ProductUpdate {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// Stored state, as read back by a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub base_price: Money,
    pub discount: Option<Discount>,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub archived_at: Option<DateTime<Utc>>,
}

/// Aggregate root: Product.
///
/// All transitions take the transition time from the caller. Dirty fields and
/// recorded events are process-local and survive until explicitly reset or
/// cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    id: ProductId,
    name: String,
    description: String,
    category: String,
    base_price: Money,
    discount: Option<Discount>,
    status: ProductStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    archived_at: Option<DateTime<Utc>>,
    loaded_updated_at: Option<DateTime<Utc>>,
    changes: ChangeTracker,
    events: Vec<ProductEvent>,
}

impl Product {
    pub fn create(input: NewProduct, now: DateTime<Utc>) -> Result<Self, ProductError> {
        Self::create_with_id(ProductId::new(), input, now)
    }

    /// A freshly created product has no dirty fields: it is persisted by a
    /// full insert, not a partial update.
    pub fn create_with_id(
        id: ProductId,
        input: NewProduct,
        now: DateTime<Utc>,
    ) -> Result<Self, ProductError> {
        let NewProduct {
            name,
            description,
            category,
            base_price,
        } = input;

        if name.is_empty() {
            return Err(ProductError::InvalidProductName);
        }
        if !base_price.is_positive() {
            return Err(ProductError::InvalidProductPrice { price: base_price });
        }
        let category = if category.is_empty() {
            DEFAULT_CATEGORY.to_string()
        } else {
            category
        };

        let created = ProductEvent::Created {
            product_id: id,
            name: name.clone(),
            description: description.clone(),
            category: category.clone(),
            base_price: base_price.clone(),
            occurred_at: now,
        };

        Ok(Self {
            id,
            name,
            description,
            category,
            base_price,
            discount: None,
            status: ProductStatus::Inactive,
            created_at: now,
            updated_at: now,
            archived_at: None,
            loaded_updated_at: None,
            changes: ChangeTracker::new(),
            events: vec![created],
        })
    }

    /// Reconstitute from storage. No events, no dirty fields.
    pub fn rebuild(snapshot: ProductSnapshot) -> Self {
        Self {
            id: snapshot.id,
            name: snapshot.name,
            description: snapshot.description,
            category: snapshot.category,
            base_price: snapshot.base_price,
            discount: snapshot.discount,
            status: snapshot.status,
            created_at: snapshot.created_at,
            updated_at: snapshot.updated_at,
            archived_at: snapshot.archived_at,
            loaded_updated_at: Some(snapshot.updated_at),
            changes: ChangeTracker::new(),
            events: Vec::new(),
        }
    }

    pub fn product_id(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn base_price(&self) -> &Money {
        &self.base_price
    }

    pub fn discount(&self) -> Option<&Discount> {
        self.discount.as_ref()
    }

    pub fn status(&self) -> ProductStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn archived_at(&self) -> Option<DateTime<Utc>> {
        self.archived_at
    }

    /// `updated_at` as it was when the product was rebuilt; `None` for new products.
    pub fn loaded_updated_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_updated_at
    }

    pub fn changes(&self) -> &ChangeTracker {
        &self.changes
    }

    /// Forget dirty fields after a successful commit when the instance is reused.
    ///
    /// The in-process `updated_at` becomes the expected stored value, so it
    /// must already have storage precision (see `SystemClock`). Reload instead
    /// when the transition time came from elsewhere.
    pub fn reset_changes(&mut self) {
        self.changes.reset();
        self.loaded_updated_at = Some(self.updated_at);
    }

    fn ensure_not_archived(&self) -> Result<(), ProductError> {
        if self.status == ProductStatus::Archived {
            return Err(ProductError::ProductArchived { id: self.id });
        }
        Ok(())
    }

    /// Apply the supplied fields. Unchanged values are ignored, as is an empty
    /// name or category; if nothing changes the call is a silent no-op.
    pub fn update(&mut self, update: ProductUpdate, now: DateTime<Utc>) -> Result<(), ProductError> {
        self.ensure_not_archived()?;

        let mut changed = ChangeTracker::new();
        if let Some(name) = update.name.filter(|n| !n.is_empty()) {
            changed.assign(Field::Name, &mut self.name, name);
        }
        if let Some(description) = update.description {
            changed.assign(Field::Description, &mut self.description, description);
        }
        if let Some(category) = update.category.filter(|c| !c.is_empty()) {
            changed.assign(Field::Category, &mut self.category, category);
        }

        if !changed.has_changes() {
            return Ok(());
        }

        self.changes.merge(&changed);
        self.updated_at = now;
        self.events.push(ProductEvent::Updated {
            product_id: self.id,
            name: changed.is_dirty(Field::Name).then(|| self.name.clone()),
            description: changed
                .is_dirty(Field::Description)
                .then(|| self.description.clone()),
            category: changed.is_dirty(Field::Category).then(|| self.category.clone()),
            occurred_at: now,
        });
        Ok(())
    }

    pub fn activate(&mut self, now: DateTime<Utc>) -> Result<(), ProductError> {
        self.ensure_not_archived()?;
        if self.status == ProductStatus::Active {
            return Err(ProductError::ProductAlreadyActive { id: self.id });
        }

        self.status = ProductStatus::Active;
        self.updated_at = now;
        self.changes.mark_dirty(Field::Status);
        self.events.push(ProductEvent::Activated {
            product_id: self.id,
            occurred_at: now,
        });
        Ok(())
    }

    pub fn deactivate(&mut self, now: DateTime<Utc>) -> Result<(), ProductError> {
        self.ensure_not_archived()?;
        if self.status == ProductStatus::Inactive {
            return Err(ProductError::ProductAlreadyInactive { id: self.id });
        }

        self.status = ProductStatus::Inactive;
        self.updated_at = now;
        self.changes.mark_dirty(Field::Status);
        self.events.push(ProductEvent::Deactivated {
            product_id: self.id,
            occurred_at: now,
        });
        Ok(())
    }

    /// Terminal transition. Records no event.
    pub fn archive(&mut self, now: DateTime<Utc>) -> Result<(), ProductError> {
        self.ensure_not_archived()?;

        self.status = ProductStatus::Archived;
        self.archived_at = Some(now);
        self.updated_at = now;
        self.changes.mark_dirty(Field::Status);
        Ok(())
    }

    /// Checks, in order: the product is active, no discount is set, and the
    /// discount window contains `now`.
    pub fn apply_discount(&mut self, discount: Discount, now: DateTime<Utc>) -> Result<(), ProductError> {
        if self.status != ProductStatus::Active {
            return Err(ProductError::ProductNotActive {
                id: self.id,
                status: self.status,
            });
        }
        if self.discount.is_some() {
            return Err(ProductError::DiscountAlreadyExists { id: self.id });
        }
        if !discount.is_valid_at(now) {
            return Err(ProductError::InvalidDiscountPeriod(PeriodProblem::NotValidAt {
                at: now,
                start: discount.start(),
                end: discount.end(),
            }));
        }

        let applied = ProductEvent::DiscountApplied {
            product_id: self.id,
            percentage: discount.percentage().to_decimal_string(),
            start_date: discount.start(),
            end_date: discount.end(),
            occurred_at: now,
        };
        self.discount = Some(discount);
        self.updated_at = now;
        self.changes.mark_dirty(Field::Discount);
        self.events.push(applied);
        Ok(())
    }

    pub fn remove_discount(&mut self, now: DateTime<Utc>) -> Result<(), ProductError> {
        self.ensure_not_archived()?;
        if self.discount.is_none() {
            return Err(ProductError::NoDiscountToRemove { id: self.id });
        }

        self.discount = None;
        self.updated_at = now;
        self.changes.mark_dirty(Field::Discount);
        self.events.push(ProductEvent::DiscountRemoved {
            product_id: self.id,
            occurred_at: now,
        });
        Ok(())
    }

    /// Discounted price while the discount window contains `now`, else the base price.
    pub fn effective_price(&self, now: DateTime<Utc>) -> Money {
        match &self.discount {
            Some(discount) if discount.is_valid_at(now) => {
                discount.calculate_discounted_price(&self.base_price)
            }
            _ => self.base_price.clone(),
        }
    }

    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            base_price: self.base_price.clone(),
            discount: self.discount.clone(),
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
            archived_at: self.archived_at,
        }
    }
}

impl AggregateRoot for Product {
    type Id = ProductId;
    type Event = ProductEvent;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn domain_events(&self) -> &[Self::Event] {
        &self.events
    }

    fn clear_events(&mut self) {
        self.events.clear();
    }
}
