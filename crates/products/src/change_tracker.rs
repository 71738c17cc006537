//! Dirty-field tracking for the product aggregate.

/// Logical product fields that can be persisted independently.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Description,
    Category,
    BasePrice,
    Discount,
    Status,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Name,
        Field::Description,
        Field::Category,
        Field::BasePrice,
        Field::Discount,
        Field::Status,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Description => "description",
            Field::Category => "category",
            Field::BasePrice => "base_price",
            Field::Discount => "discount",
            Field::Status => "status",
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Set of fields mutated since creation, rebuild, or the last `reset`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ChangeTracker {
    dirty: u8,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_dirty(&mut self, field: Field) {
        self.dirty |= field.bit();
    }

    pub fn is_dirty(&self, field: Field) -> bool {
        self.dirty & field.bit() != 0
    }

    pub fn has_changes(&self) -> bool {
        self.dirty != 0
    }

    pub fn reset(&mut self) {
        self.dirty = 0;
    }

    /// Dirty fields in declaration order.
    pub fn dirty_fields(&self) -> impl Iterator<Item = Field> + '_ {
        Field::ALL.into_iter().filter(|f| self.is_dirty(*f))
    }

    pub fn merge(&mut self, other: &ChangeTracker) {
        self.dirty |= other.dirty;
    }

    /// Store `value` into `slot` and mark `field` dirty, but only when the value
    /// actually differs. Returns whether anything changed.
    pub fn assign<T: PartialEq>(&mut self, field: Field, slot: &mut T, value: T) -> bool {
        if *slot == value {
            return false;
        }
        *slot = value;
        self.mark_dirty(field);
        true
    }
}
