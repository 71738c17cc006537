//! Translation between `Product` and the `products` table.

use core::fmt;
use core::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use catalog_core::money::{format_rational, parse_rational};
use catalog_core::{Money, ProductId};
use catalog_products::{ChangeTracker, Discount, Field, Product, ProductSnapshot, ProductStatus};

use super::RepositoryError;
use crate::commit::{Columns, Key, Operation, Precondition, StoredRow, Table, Value};

/// Column names of the `products` table.
pub mod columns {
    pub const PRODUCT_ID: &str = "product_id";
    pub const NAME: &str = "name";
    pub const DESCRIPTION: &str = "description";
    pub const CATEGORY: &str = "category";
    pub const BASE_PRICE_NUMERATOR: &str = "base_price_numerator";
    pub const BASE_PRICE_DENOMINATOR: &str = "base_price_denominator";
    pub const DISCOUNT_PERCENT: &str = "discount_percent";
    pub const DISCOUNT_START_DATE: &str = "discount_start_date";
    pub const DISCOUNT_END_DATE: &str = "discount_end_date";
    pub const STATUS: &str = "status";
    pub const CREATED_AT: &str = "created_at";
    pub const UPDATED_AT: &str = "updated_at";
    pub const ARCHIVED_AT: &str = "archived_at";

    /// Every column, in table order.
    pub const ALL: [&str; 13] = [
        PRODUCT_ID,
        NAME,
        DESCRIPTION,
        CATEGORY,
        BASE_PRICE_NUMERATOR,
        BASE_PRICE_DENOMINATOR,
        DISCOUNT_PERCENT,
        DISCOUNT_START_DATE,
        DISCOUNT_END_DATE,
        STATUS,
        CREATED_AT,
        UPDATED_AT,
        ARCHIVED_AT,
    ];
}

use columns::*;

/// How partial updates guard against concurrent writers.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum ConcurrencyMode {
    /// No guard: concurrent writers win per column.
    #[default]
    LastWriteWins,
    /// Updates require the stored `updated_at` to equal the loaded one.
    Optimistic,
}

impl ConcurrencyMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ConcurrencyMode::LastWriteWins => "last-write-wins",
            ConcurrencyMode::Optimistic => "optimistic",
        }
    }
}

impl fmt::Display for ConcurrencyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConcurrencyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "last-write-wins" => Ok(ConcurrencyMode::LastWriteWins),
            "optimistic" => Ok(ConcurrencyMode::Optimistic),
            other => Err(other.to_string()),
        }
    }
}

/// One `products` row with typed columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRow {
    pub product_id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub base_price_numerator: i64,
    pub base_price_denominator: i64,
    /// Exact rational text, e.g. `"25"` or `"25/2"`.
    pub discount_percent: Option<String>,
    pub discount_start_date: Option<DateTime<Utc>>,
    pub discount_end_date: Option<DateTime<Utc>>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub archived_at: Option<DateTime<Utc>>,
}

impl ProductRow {
    pub fn from_product(product: &Product) -> Result<Self, RepositoryError> {
        let (numerator, denominator) = price_parts(product.base_price())?;
        let discount = product.discount();
        Ok(Self {
            product_id: *product.product_id().as_uuid(),
            name: product.name().to_string(),
            description: product.description().to_string(),
            category: product.category().to_string(),
            base_price_numerator: numerator,
            base_price_denominator: denominator,
            discount_percent: discount.map(|d| format_rational(d.percentage().as_ratio())),
            discount_start_date: discount.map(Discount::start),
            discount_end_date: discount.map(Discount::end),
            status: product.status().as_str().to_string(),
            created_at: product.created_at(),
            updated_at: product.updated_at(),
            archived_at: product.archived_at(),
        })
    }

    /// Rebuild domain state. Any stored value the domain would reject is
    /// reported as corrupt rather than silently dropped.
    pub fn into_snapshot(self) -> Result<ProductSnapshot, RepositoryError> {
        let base_price = Money::new(self.base_price_numerator, self.base_price_denominator)
            .map_err(|e| corrupt(BASE_PRICE_DENOMINATOR, e))?;
        let status = self
            .status
            .parse::<ProductStatus>()
            .map_err(|e| corrupt(STATUS, e))?;

        let discount = match (
            self.discount_percent,
            self.discount_start_date,
            self.discount_end_date,
        ) {
            (Some(percent), Some(start), Some(end)) => {
                let percentage = parse_rational(&percent).map_err(|e| corrupt(DISCOUNT_PERCENT, e))?;
                Some(
                    Discount::new(Some(percentage), start, end)
                        .map_err(|e| corrupt(DISCOUNT_PERCENT, e))?,
                )
            }
            (None, None, None) => None,
            _ => {
                return Err(corrupt(
                    DISCOUNT_PERCENT,
                    "discount columns must be all set or all null",
                ));
            }
        };

        Ok(ProductSnapshot {
            id: ProductId::from_uuid(self.product_id),
            name: self.name,
            description: self.description,
            category: self.category,
            base_price,
            discount,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
            archived_at: self.archived_at,
        })
    }

    /// All columns, in table order.
    pub fn into_columns(self) -> Columns {
        vec![
            (PRODUCT_ID, Value::Uuid(self.product_id)),
            (NAME, Value::text(self.name)),
            (DESCRIPTION, Value::text(self.description)),
            (CATEGORY, Value::text(self.category)),
            (BASE_PRICE_NUMERATOR, Value::Int(Some(self.base_price_numerator))),
            (BASE_PRICE_DENOMINATOR, Value::Int(Some(self.base_price_denominator))),
            (DISCOUNT_PERCENT, Value::Text(self.discount_percent)),
            (DISCOUNT_START_DATE, Value::Timestamp(self.discount_start_date)),
            (DISCOUNT_END_DATE, Value::Timestamp(self.discount_end_date)),
            (STATUS, Value::text(self.status)),
            (CREATED_AT, Value::timestamp(self.created_at)),
            (UPDATED_AT, Value::timestamp(self.updated_at)),
            (ARCHIVED_AT, Value::Timestamp(self.archived_at)),
        ]
    }

    /// Read a row held by the in-memory store.
    pub fn from_stored(row: &StoredRow) -> Result<Self, RepositoryError> {
        Ok(Self {
            product_id: uuid_column(row, PRODUCT_ID)?,
            name: text_column(row, NAME)?,
            description: text_column(row, DESCRIPTION)?,
            category: text_column(row, CATEGORY)?,
            base_price_numerator: int_column(row, BASE_PRICE_NUMERATOR)?,
            base_price_denominator: int_column(row, BASE_PRICE_DENOMINATOR)?,
            discount_percent: nullable_text_column(row, DISCOUNT_PERCENT)?,
            discount_start_date: nullable_timestamp_column(row, DISCOUNT_START_DATE)?,
            discount_end_date: nullable_timestamp_column(row, DISCOUNT_END_DATE)?,
            status: text_column(row, STATUS)?,
            created_at: timestamp_column(row, CREATED_AT)?,
            updated_at: timestamp_column(row, UPDATED_AT)?,
            archived_at: nullable_timestamp_column(row, ARCHIVED_AT)?,
        })
    }
}

/// Builds insert and minimal update operations for products.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ProductMapper {
    mode: ConcurrencyMode,
}

impl ProductMapper {
    pub fn new(mode: ConcurrencyMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ConcurrencyMode {
        self.mode
    }

    /// Full row insert, used only for newly created products.
    pub fn insert_op(&self, product: &Product) -> Result<Operation, RepositoryError> {
        Ok(Operation::Insert {
            table: Table::Products,
            row: ProductRow::from_product(product)?.into_columns(),
        })
    }

    /// Partial update containing only dirty columns plus `updated_at`.
    ///
    /// Returns `None` when nothing is dirty.
    pub fn update_op(&self, product: &Product) -> Result<Option<Operation>, RepositoryError> {
        let changes: &ChangeTracker = product.changes();
        if !changes.has_changes() {
            return Ok(None);
        }

        let mut set = Columns::new();
        for field in changes.dirty_fields() {
            match field {
                Field::Name => set.push((NAME, Value::text(product.name()))),
                Field::Description => set.push((DESCRIPTION, Value::text(product.description()))),
                Field::Category => set.push((CATEGORY, Value::text(product.category()))),
                Field::BasePrice => {
                    let (numerator, denominator) = price_parts(product.base_price())?;
                    set.push((BASE_PRICE_NUMERATOR, Value::Int(Some(numerator))));
                    set.push((BASE_PRICE_DENOMINATOR, Value::Int(Some(denominator))));
                }
                Field::Discount => {
                    let discount = product.discount();
                    set.push((
                        DISCOUNT_PERCENT,
                        Value::Text(discount.map(|d| format_rational(d.percentage().as_ratio()))),
                    ));
                    set.push((DISCOUNT_START_DATE, Value::Timestamp(discount.map(Discount::start))));
                    set.push((DISCOUNT_END_DATE, Value::Timestamp(discount.map(Discount::end))));
                }
                Field::Status => {
                    set.push((STATUS, Value::text(product.status().as_str())));
                    set.push((ARCHIVED_AT, Value::Timestamp(product.archived_at())));
                }
            }
        }
        set.push((UPDATED_AT, Value::timestamp(product.updated_at())));

        let precondition = match self.mode {
            ConcurrencyMode::LastWriteWins => None,
            ConcurrencyMode::Optimistic => product
                .loaded_updated_at()
                .map(Precondition::UpdatedAtEquals),
        };

        Ok(Some(Operation::Update {
            table: Table::Products,
            key: Key {
                column: PRODUCT_ID,
                value: Value::Uuid(*product.product_id().as_uuid()),
            },
            set,
            precondition,
        }))
    }
}

fn price_parts(price: &Money) -> Result<(i64, i64), RepositoryError> {
    price
        .to_i64_parts()
        .ok_or_else(|| RepositoryError::PriceOutOfRange {
            price: price.to_string(),
        })
}

fn corrupt(column: &'static str, reason: impl fmt::Display) -> RepositoryError {
    RepositoryError::Corrupt {
        column,
        reason: reason.to_string(),
    }
}

fn column<'a>(row: &'a StoredRow, name: &'static str) -> Result<&'a Value, RepositoryError> {
    row.get(name).ok_or_else(|| corrupt(name, "missing column"))
}

fn uuid_column(row: &StoredRow, name: &'static str) -> Result<Uuid, RepositoryError> {
    match column(row, name)? {
        Value::Uuid(u) => Ok(*u),
        other => Err(corrupt(name, format!("expected uuid, got {other:?}"))),
    }
}

fn int_column(row: &StoredRow, name: &'static str) -> Result<i64, RepositoryError> {
    match column(row, name)? {
        Value::Int(Some(i)) => Ok(*i),
        other => Err(corrupt(name, format!("expected integer, got {other:?}"))),
    }
}

fn text_column(row: &StoredRow, name: &'static str) -> Result<String, RepositoryError> {
    nullable_text_column(row, name)?.ok_or_else(|| corrupt(name, "unexpected NULL"))
}

fn nullable_text_column(row: &StoredRow, name: &'static str) -> Result<Option<String>, RepositoryError> {
    match column(row, name)? {
        Value::Text(s) => Ok(s.clone()),
        other => Err(corrupt(name, format!("expected text, got {other:?}"))),
    }
}

fn timestamp_column(row: &StoredRow, name: &'static str) -> Result<DateTime<Utc>, RepositoryError> {
    nullable_timestamp_column(row, name)?.ok_or_else(|| corrupt(name, "unexpected NULL"))
}

fn nullable_timestamp_column(
    row: &StoredRow,
    name: &'static str,
) -> Result<Option<DateTime<Utc>>, RepositoryError> {
    match column(row, name)? {
        Value::Timestamp(t) => Ok(*t),
        other => Err(corrupt(name, format!("expected timestamp, got {other:?}"))),
    }
}
