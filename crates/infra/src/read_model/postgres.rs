//! Postgres-backed product queries.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Row};
use tracing::{error, instrument};

use catalog_core::ProductId;

use super::{Pagination, ProductFilter, ProductPage, ProductQueries, ProductView, ReadModelError};
use crate::repository::ProductRow;
use crate::repository::postgres::SELECT_PRODUCT_COLUMNS;

#[derive(Debug, Clone)]
pub struct PostgresProductQueries {
    pool: Arc<PgPool>,
}

impl PostgresProductQueries {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait::async_trait]
impl ProductQueries for PostgresProductQueries {
    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn get_product(&self, id: ProductId, now: DateTime<Utc>) -> Result<ProductView, ReadModelError> {
        let row = sqlx::query(&format!("{SELECT_PRODUCT_COLUMNS} WHERE product_id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_product", e))?
            .ok_or(ReadModelError::NotFound(id))?;

        let row = ProductRow::from_row(&row).map_err(|e| map_sqlx_error("decode_product", e))?;
        ProductView::from_row(row, now)
    }

    #[instrument(skip(self), err)]
    async fn list_products(
        &self,
        filter: ProductFilter,
        pagination: Pagination,
        now: DateTime<Utc>,
    ) -> Result<ProductPage, ReadModelError> {
        let category = filter.category.as_deref();
        let status = filter.status.map(|s| s.as_str());

        let count_row = sqlx::query(
            r#"
            SELECT COUNT(*) AS total
            FROM products
            WHERE ($1::text IS NULL OR category = $1)
                AND ($2::text IS NULL OR status = $2)
            "#,
        )
        .bind(category)
        .bind(status)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("count_products", e))?;

        let total: i64 = count_row
            .try_get("total")
            .map_err(|e| map_sqlx_error("decode_count", e))?;

        let rows = sqlx::query(&format!(
            r#"{SELECT_PRODUCT_COLUMNS}
            WHERE ($1::text IS NULL OR category = $1)
                AND ($2::text IS NULL OR status = $2)
            ORDER BY created_at DESC, product_id ASC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(category)
        .bind(status)
        .bind(i64::from(pagination.limit))
        .bind(i64::from(pagination.offset))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_products", e))?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let row = ProductRow::from_row(&row).map_err(|e| map_sqlx_error("decode_product", e))?;
            items.push(ProductView::from_row(row, now)?);
        }

        Ok(ProductPage::new(items, total.max(0) as u64, pagination))
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> ReadModelError {
    let msg = match &err {
        sqlx::Error::Database(db_err) => {
            format!("database error in {operation}: {}", db_err.message())
        }
        sqlx::Error::PoolClosed => format!("connection pool closed in {operation}"),
        other => format!("sqlx error in {operation}: {other}"),
    };
    error!(operation, error = %msg, "postgres product query failed");
    ReadModelError::Storage(msg)
}
