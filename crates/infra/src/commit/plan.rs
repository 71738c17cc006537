use super::operation::Operation;

/// Ordered operations applied as one atomic unit.
///
/// Built fresh per use-case call and consumed by `Committer::apply`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitPlan {
    operations: Vec<Operation>,
}

impl CommitPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, operation: Operation) {
        self.operations.push(operation);
    }

    /// Appends the operation if there is one.
    pub fn add_optional(&mut self, operation: Option<Operation>) {
        if let Some(operation) = operation {
            self.operations.push(operation);
        }
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn into_operations(self) -> Vec<Operation> {
        self.operations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::operation::{Table, Value};

    fn insert(n: i64) -> Operation {
        Operation::Insert {
            table: Table::OutboxEvents,
            row: vec![("n", Value::Int(Some(n)))],
        }
    }

    #[test]
    fn keeps_insertion_order_and_skips_none() {
        let mut plan = CommitPlan::new();
        assert!(plan.is_empty());

        plan.add(insert(1));
        plan.add_optional(None);
        plan.add_optional(Some(insert(2)));

        assert_eq!(plan.len(), 2);
        assert_eq!(plan.operations()[0], insert(1));
        assert_eq!(plan.into_operations()[1], insert(2));
    }
}
