//! Runs one product through its lifecycle against the configured stores.
//!
//! `USE_PERSISTENT_STORES=true` expects the `products` and `outbox_events`
//! tables to exist already.

use std::sync::Arc;

use anyhow::Context;
use chrono::Duration;
use sqlx::postgres::PgPoolOptions;

use catalog_core::{BigInt, BigRational, Clock, Money, SystemClock};
use catalog_infra::commit::{Committer, InMemoryStore, PostgresCommitter};
use catalog_infra::config::AppConfig;
use catalog_infra::read_model::{
    InMemoryProductQueries, PostgresProductQueries, ProductQueries,
};
use catalog_infra::repository::{
    InMemoryProductRepository, PostgresProductRepository, ProductMapper, ProductRepository,
};
use catalog_infra::usecases::{ApplyDiscountRequest, CreateProductRequest, ProductUseCases};
use catalog_products::ProductUpdate;

struct Stores {
    repository: Arc<dyn ProductRepository>,
    committer: Arc<dyn Committer>,
    queries: Arc<dyn ProductQueries>,
}

async fn build_stores(config: &AppConfig) -> anyhow::Result<Stores> {
    let mapper = ProductMapper::new(config.concurrency);
    match &config.database {
        Some(db) => {
            let pool = PgPoolOptions::new()
                .max_connections(db.max_connections)
                .connect(&db.url)
                .await
                .context("failed to connect to Postgres")?;
            tracing::info!(max_connections = db.max_connections, "using Postgres stores");
            Ok(Stores {
                repository: Arc::new(PostgresProductRepository::new(pool.clone(), mapper)),
                committer: Arc::new(PostgresCommitter::new(pool.clone())),
                queries: Arc::new(PostgresProductQueries::new(pool)),
            })
        }
        None => {
            tracing::info!("using in-memory stores");
            let store = Arc::new(InMemoryStore::new());
            Ok(Stores {
                repository: Arc::new(InMemoryProductRepository::new(store.clone(), mapper)),
                committer: store.clone(),
                queries: Arc::new(InMemoryProductQueries::new(store)),
            })
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    catalog_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    tracing::info!(concurrency = %config.concurrency, persistent = config.use_persistent_stores(), "starting");

    let stores = build_stores(&config).await?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let use_cases = ProductUseCases::new(stores.repository, stores.committer, clock.clone())
        .with_metadata(config.default_metadata());

    let product = use_cases
        .create_product(
            CreateProductRequest::new("Cordless Drill", "tools", Money::new(19999, 100)?)
                .with_description("18V, two batteries"),
        )
        .await?;
    let id = product.product_id();

    use_cases
        .update_product(id, ProductUpdate::default().description("18V, two batteries, case"))
        .await?;
    use_cases.activate_product(id).await?;

    let now = clock.now();
    use_cases
        .apply_discount(
            id,
            ApplyDiscountRequest::new(
                BigRational::from_integer(BigInt::from(15)),
                now - Duration::minutes(1),
                now + Duration::days(7),
            ),
        )
        .await?;

    let view = stores.queries.get_product(id, clock.now()).await?;
    tracing::info!(
        product_id = %view.id,
        status = %view.status,
        base_price = %view.base_price,
        effective_price = %view.effective_price,
        effective_price_decimal = %view.effective_price.to_decimal_string(2),
        "discounted product"
    );

    use_cases.remove_discount(id).await?;
    use_cases.deactivate_product(id).await?;
    use_cases.archive_product(id).await?;

    let view = stores.queries.get_product(id, clock.now()).await?;
    tracing::info!(product_id = %view.id, status = %view.status, "lifecycle finished");
    Ok(())
}
