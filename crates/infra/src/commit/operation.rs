//! Storage-engine-agnostic persistence operations.

use core::fmt;

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Tables the catalog writes to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    Products,
    OutboxEvents,
}

impl Table {
    pub fn as_str(self) -> &'static str {
        match self {
            Table::Products => "products",
            Table::OutboxEvents => "outbox_events",
        }
    }

    pub fn primary_key(self) -> &'static str {
        match self {
            Table::Products => "product_id",
            Table::OutboxEvents => "event_id",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed column value. `None` is SQL `NULL`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Uuid(Uuid),
    Int(Option<i64>),
    Text(Option<String>),
    Timestamp(Option<DateTime<Utc>>),
    Json(JsonValue),
}

impl Value {
    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(Some(value.into()))
    }

    pub fn timestamp(value: DateTime<Utc>) -> Self {
        Value::Timestamp(Some(value))
    }

    pub fn is_null(&self) -> bool {
        matches!(
            self,
            Value::Int(None) | Value::Text(None) | Value::Timestamp(None)
        )
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Uuid(u) => write!(f, "{u}"),
            Value::Int(Some(i)) => write!(f, "{i}"),
            Value::Text(Some(s)) => f.write_str(s),
            Value::Timestamp(Some(t)) => write!(f, "{}", t.to_rfc3339()),
            Value::Json(j) => write!(f, "{j}"),
            Value::Int(None) | Value::Text(None) | Value::Timestamp(None) => f.write_str("NULL"),
        }
    }
}

/// Ordered `(column, value)` pairs.
pub type Columns = Vec<(&'static str, Value)>;

/// Row identity for an update.
#[derive(Debug, Clone, PartialEq)]
pub struct Key {
    pub column: &'static str,
    pub value: Value,
}

/// Guard checked against the stored row before an update is applied.
#[derive(Debug, Clone, PartialEq)]
pub enum Precondition {
    /// The stored `updated_at` still equals the value the aggregate was loaded with.
    UpdatedAtEquals(DateTime<Utc>),
}

impl Precondition {
    pub fn column(&self) -> &'static str {
        match self {
            Precondition::UpdatedAtEquals(_) => "updated_at",
        }
    }

    pub fn expected(&self) -> Value {
        match self {
            Precondition::UpdatedAtEquals(at) => Value::timestamp(*at),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Full row insert. Fails if the primary key already exists.
    Insert { table: Table, row: Columns },
    /// Partial update of an existing row. Only `set` columns are written.
    Update {
        table: Table,
        key: Key,
        set: Columns,
        precondition: Option<Precondition>,
    },
}

impl Operation {
    pub fn table(&self) -> Table {
        match self {
            Operation::Insert { table, .. } | Operation::Update { table, .. } => *table,
        }
    }

    /// Columns written by this operation.
    pub fn columns(&self) -> &[(&'static str, Value)] {
        match self {
            Operation::Insert { row, .. } => row,
            Operation::Update { set, .. } => set,
        }
    }

    pub fn value(&self, column: &str) -> Option<&Value> {
        self.columns()
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, value)| value)
    }

    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns().iter().map(|(name, _)| *name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_column() {
        let op = Operation::Update {
            table: Table::Products,
            key: Key {
                column: "product_id",
                value: Value::Uuid(Uuid::nil()),
            },
            set: vec![("category", Value::text("tools")), ("discount_percent", Value::Text(None))],
            precondition: None,
        };

        assert_eq!(op.table(), Table::Products);
        assert_eq!(op.value("category"), Some(&Value::text("tools")));
        assert!(op.value("discount_percent").is_some_and(Value::is_null));
        assert_eq!(op.value("name"), None);
        assert_eq!(op.column_names(), vec!["category", "discount_percent"]);
    }

    #[test]
    fn null_values_render_as_null() {
        assert_eq!(Value::Timestamp(None).to_string(), "NULL");
        assert_eq!(Value::Int(Some(7)).to_string(), "7");
    }
}
