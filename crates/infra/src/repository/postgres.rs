//! Postgres-backed product repository.
//!
//! Only reads live here; writes go through `PostgresCommitter` as operations.

use std::sync::Arc;

use sqlx::{PgPool, Row};
use tracing::{error, instrument};

use catalog_core::ProductId;
use catalog_products::Product;

use super::mapping::{ProductMapper, ProductRow};
use super::{ProductRepository, RepositoryError};

pub(crate) const SELECT_PRODUCT_COLUMNS: &str = r#"
    SELECT
        product_id,
        name,
        description,
        category,
        base_price_numerator,
        base_price_denominator,
        discount_percent,
        discount_start_date,
        discount_end_date,
        status,
        created_at,
        updated_at,
        archived_at
    FROM products
"#;

#[derive(Debug, Clone)]
pub struct PostgresProductRepository {
    pool: Arc<PgPool>,
    mapper: ProductMapper,
}

impl PostgresProductRepository {
    pub fn new(pool: PgPool, mapper: ProductMapper) -> Self {
        Self {
            pool: Arc::new(pool),
            mapper,
        }
    }
}

#[async_trait::async_trait]
impl ProductRepository for PostgresProductRepository {
    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn load(&self, id: ProductId) -> Result<Product, RepositoryError> {
        let row = sqlx::query(&format!("{SELECT_PRODUCT_COLUMNS} WHERE product_id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("load_product", e))?
            .ok_or(RepositoryError::NotFound(id))?;

        let row = <ProductRow as sqlx::FromRow<'_, sqlx::postgres::PgRow>>::from_row(&row)
            .map_err(|e| map_sqlx_error("decode_product", e))?;
        Ok(Product::rebuild(row.into_snapshot()?))
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn exists(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let row = sqlx::query("SELECT 1 FROM products WHERE product_id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("product_exists", e))?;
        Ok(row.is_some())
    }

    fn mapper(&self) -> &ProductMapper {
        &self.mapper
    }
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for ProductRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(ProductRow {
            product_id: row.try_get("product_id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            category: row.try_get("category")?,
            base_price_numerator: row.try_get("base_price_numerator")?,
            base_price_denominator: row.try_get("base_price_denominator")?,
            discount_percent: row.try_get("discount_percent")?,
            discount_start_date: row.try_get("discount_start_date")?,
            discount_end_date: row.try_get("discount_end_date")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            archived_at: row.try_get("archived_at")?,
        })
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> RepositoryError {
    let msg = match &err {
        sqlx::Error::Database(db_err) => {
            format!("database error in {operation}: {}", db_err.message())
        }
        sqlx::Error::PoolClosed => format!("connection pool closed in {operation}"),
        other => format!("sqlx error in {operation}: {other}"),
    };
    error!(operation, error = %msg, "postgres product read failed");
    RepositoryError::Storage(msg)
}
