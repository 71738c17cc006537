//! Postgres committer.
//!
//! A plan runs inside a single transaction. The first failing statement aborts
//! the plan; the transaction is rolled back when it is dropped uncommitted.
//!
//! ## Error Mapping
//!
//! | Failure | CommitError |
//! |---------|-------------|
//! | unique violation (`23505`) on insert | `DuplicateKey` |
//! | update matched no row, row exists, precondition present | `Conflict` |
//! | update matched no row, row absent | `MissingRow` |
//! | anything else | `Storage` |

use std::sync::Arc;

use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use tracing::{error, instrument};

use super::operation::{Columns, Key, Operation, Precondition, Table, Value};
use super::plan::CommitPlan;
use super::{CommitError, Committer};

#[derive(Debug, Clone)]
pub struct PostgresCommitter {
    pool: Arc<PgPool>,
}

impl PostgresCommitter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait::async_trait]
impl Committer for PostgresCommitter {
    #[instrument(skip(self, plan), fields(operations = plan.len()), err)]
    async fn apply(&self, plan: CommitPlan) -> Result<(), CommitError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        for operation in plan.into_operations() {
            execute(&mut tx, operation).await?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))
    }
}

async fn execute(tx: &mut Transaction<'_, Postgres>, operation: Operation) -> Result<(), CommitError> {
    match operation {
        Operation::Insert { table, row } => insert(tx, table, row).await,
        Operation::Update {
            table,
            key,
            set,
            precondition,
        } => update(tx, table, key, set, precondition).await,
    }
}

async fn insert(tx: &mut Transaction<'_, Postgres>, table: Table, row: Columns) -> Result<(), CommitError> {
    let pk = table.primary_key();
    let key = row
        .iter()
        .find(|(column, _)| *column == pk)
        .map(|(_, value)| value.to_string())
        .unwrap_or_default();

    let mut qb = QueryBuilder::<Postgres>::new(format!("INSERT INTO {table} ("));
    let (columns, values): (Vec<_>, Vec<_>) = row.into_iter().unzip();
    qb.push(columns.join(", "));
    qb.push(") VALUES (");
    for (idx, value) in values.into_iter().enumerate() {
        if idx > 0 {
            qb.push(", ");
        }
        push_bind(&mut qb, value);
    }
    qb.push(")");

    qb.build().execute(&mut **tx).await.map_err(|e| {
        if is_unique_violation(&e) {
            CommitError::DuplicateKey { table, key }
        } else {
            map_sqlx_error("insert", e)
        }
    })?;
    Ok(())
}

async fn update(
    tx: &mut Transaction<'_, Postgres>,
    table: Table,
    key: Key,
    set: Columns,
    precondition: Option<Precondition>,
) -> Result<(), CommitError> {
    let key_text = key.value.to_string();

    let mut qb = QueryBuilder::<Postgres>::new(format!("UPDATE {table} SET "));
    for (idx, (column, value)) in set.into_iter().enumerate() {
        if idx > 0 {
            qb.push(", ");
        }
        qb.push(column);
        qb.push(" = ");
        push_bind(&mut qb, value);
    }
    qb.push(format!(" WHERE {} = ", key.column));
    push_bind(&mut qb, key.value.clone());
    if let Some(precondition) = &precondition {
        qb.push(format!(" AND {} = ", precondition.column()));
        push_bind(&mut qb, precondition.expected());
    }

    let result = qb
        .build()
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("update", e))?;

    if result.rows_affected() > 0 {
        return Ok(());
    }

    if precondition.is_some() && row_exists(tx, table, &key).await? {
        return Err(CommitError::Conflict {
            table,
            key: key_text,
        });
    }
    Err(CommitError::MissingRow {
        table,
        key: key_text,
    })
}

async fn row_exists(tx: &mut Transaction<'_, Postgres>, table: Table, key: &Key) -> Result<bool, CommitError> {
    let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT 1 FROM {table} WHERE {} = ", key.column));
    push_bind(&mut qb, key.value.clone());
    let row = qb
        .build()
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("row_exists", e))?;
    Ok(row.is_some())
}

fn push_bind(qb: &mut QueryBuilder<'_, Postgres>, value: Value) {
    match value {
        Value::Uuid(v) => qb.push_bind(v),
        Value::Int(v) => qb.push_bind(v),
        Value::Text(v) => qb.push_bind(v),
        Value::Timestamp(v) => qb.push_bind(v),
        Value::Json(v) => qb.push_bind(v),
    };
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23505"),
        _ => false,
    }
}

/// Map SQLx errors to an opaque `CommitError`, logging the detail here.
pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> CommitError {
    let msg = match &err {
        sqlx::Error::Database(db_err) => {
            format!("database error in {operation}: {}", db_err.message())
        }
        sqlx::Error::PoolClosed => format!("connection pool closed in {operation}"),
        other => format!("sqlx error in {operation}: {other}"),
    };
    error!(operation, error = %msg, "postgres commit failed");
    CommitError::Storage(msg)
}
