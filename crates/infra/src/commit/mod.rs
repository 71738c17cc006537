//! Commit plans and their atomic application.

pub mod in_memory;
pub mod operation;
pub mod plan;
pub mod postgres;

pub use in_memory::{InMemoryStore, StoredRow};
pub use operation::{Columns, Key, Operation, Precondition, Table, Value};
pub use plan::CommitPlan;
pub use postgres::PostgresCommitter;

use thiserror::Error;

use catalog_core::{Classify, ErrorKind};

/// Commit failures.
///
/// `Conflict` is only produced by updates that carry a `Precondition`.
/// Everything else is an opaque infrastructure failure to callers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommitError {
    #[error("precondition failed on {table} row {key}")]
    Conflict { table: Table, key: String },

    #[error("no row in {table} with key {key}")]
    MissingRow { table: Table, key: String },

    #[error("duplicate key in {table}: {key}")]
    DuplicateKey { table: Table, key: String },

    #[error("storage failure: {0}")]
    Storage(String),
}

impl Classify for CommitError {
    fn kind(&self) -> ErrorKind {
        match self {
            CommitError::Conflict { .. } => ErrorKind::Conflict,
            CommitError::MissingRow { .. }
            | CommitError::DuplicateKey { .. }
            | CommitError::Storage(_) => ErrorKind::Infrastructure,
        }
    }
}

/// Applies a plan as a single atomic unit: every operation takes effect or none does.
///
/// Implementations do not retry. Dropping the returned future before it
/// resolves abandons the commit; a partially executed transaction is rolled back.
#[async_trait::async_trait]
pub trait Committer: Send + Sync {
    async fn apply(&self, plan: CommitPlan) -> Result<(), CommitError>;
}
