//! End-to-end tests across the write and read sides.
//!
//! Interactors → CommitPlan → InMemoryStore → ProductQueries

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use serde_json::json;

use catalog_core::{BigInt, BigRational, Clock, FixedClock, Money, ProductId};
use catalog_events::Metadata;
use catalog_products::{Discount, NewProduct, Product, ProductStatus, ProductUpdate};

use crate::commit::{CommitPlan, Committer, InMemoryStore, Table};
use crate::outbox::OutboxRecord;
use crate::read_model::{InMemoryProductQueries, Pagination, ProductFilter, ProductQueries};
use crate::repository::{ConcurrencyMode, InMemoryProductRepository, ProductMapper, ProductRepository};
use crate::usecases::{ApplyDiscountRequest, CreateProductRequest, ProductUseCases};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
}

fn pct(n: i64, d: i64) -> BigRational {
    BigRational::new(BigInt::from(n), BigInt::from(d))
}

struct Catalog {
    store: Arc<InMemoryStore>,
    clock: Arc<FixedClock>,
    repository: Arc<InMemoryProductRepository>,
    use_cases: ProductUseCases,
    queries: InMemoryProductQueries,
}

fn setup(mode: ConcurrencyMode) -> Catalog {
    let store = Arc::new(InMemoryStore::new());
    let clock = Arc::new(FixedClock::new(t0()));
    let repository = Arc::new(InMemoryProductRepository::new(store.clone(), ProductMapper::new(mode)));
    let use_cases = ProductUseCases::new(repository.clone(), store.clone(), clock.clone())
        .with_metadata(Metadata::new().with("user_id", "u-1").with("company_id", "acme"));
    let queries = InMemoryProductQueries::new(store.clone());
    Catalog {
        store,
        clock,
        repository,
        use_cases,
        queries,
    }
}

fn outbox(store: &InMemoryStore) -> Vec<OutboxRecord> {
    let mut records: Vec<_> = store
        .rows(Table::OutboxEvents)
        .unwrap()
        .iter()
        .map(|row| OutboxRecord::from_stored(row).unwrap())
        .collect();
    records.sort_by_key(|r| r.created_at);
    records
}

#[tokio::test]
async fn lifecycle_is_visible_on_the_read_side() {
    let c = setup(ConcurrencyMode::LastWriteWins);

    let id = c
        .use_cases
        .create_product(
            CreateProductRequest::new("Cordless Drill", "tools", Money::new(19999, 100).unwrap())
                .with_description("18V"),
        )
        .await
        .unwrap()
        .product_id();
    c.clock.advance(Duration::minutes(1));
    c.use_cases.activate_product(id).await.unwrap();
    c.clock.advance(Duration::minutes(1));

    let now = c.clock.now();
    c.use_cases
        .apply_discount(
            id,
            ApplyDiscountRequest::new(pct(10, 1), now, now + Duration::days(2)),
        )
        .await
        .unwrap();

    let view = c.queries.get_product(id, now).await.unwrap();
    assert_eq!(view.name, "Cordless Drill");
    assert_eq!(view.status, ProductStatus::Active);
    assert_eq!(view.effective_price, Money::new(179991, 1000).unwrap());
    assert_eq!(view.discount_amount, Some(Money::new(19999, 1000).unwrap()));
    let discount = view.discount.unwrap();
    assert!(discount.active);
    assert_eq!(discount.percentage, "10");

    // Past the window the discount stays stored but no longer applies.
    let later = now + Duration::days(3);
    let view = c.queries.get_product(id, later).await.unwrap();
    assert_eq!(view.effective_price, Money::new(19999, 100).unwrap());
    assert!(!view.discount.unwrap().active);

    let records = outbox(&c.store);
    let types: Vec<_> = records.iter().map(|r| r.event_type.as_str()).collect();
    assert_eq!(types, vec!["product.created", "product.activated", "discount.applied"]);
    for record in &records {
        assert_eq!(record.aggregate_id, id.to_string());
        assert_eq!(record.status, "pending");
        assert_eq!(record.payload["metadata"], json!({ "user_id": "u-1", "company_id": "acme" }));
    }
}

#[tokio::test]
async fn listing_filters_and_orders_newest_first() {
    let c = setup(ConcurrencyMode::LastWriteWins);
    let mut ids = Vec::new();
    for (name, category) in [("Saw", "tools"), ("Rake", "garden"), ("Plane", "tools")] {
        let product = c
            .use_cases
            .create_product(CreateProductRequest::new(name, category, Money::from_integer(10)))
            .await
            .unwrap();
        ids.push(product.product_id());
        c.clock.advance(Duration::minutes(1));
    }
    c.use_cases.activate_product(ids[2]).await.unwrap();

    let now = c.clock.now();
    let tools = ProductFilter {
        category: Some("tools".into()),
        status: None,
    };
    let page = c.queries.list_products(tools, Pagination::default(), now).await.unwrap();
    let names: Vec<_> = page.items.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["Plane", "Saw"]);
    assert_eq!(page.total, 2);
    assert!(!page.has_more);

    let active = ProductFilter {
        category: None,
        status: Some(ProductStatus::Active),
    };
    let page = c.queries.list_products(active, Pagination::default(), now).await.unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, ids[2]);

    let page = c
        .queries
        .list_products(ProductFilter::default(), Pagination::new(Some(1), Some(1)), now)
        .await
        .unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.items[0].name, "Rake");
    assert!(page.has_more);
}

#[tokio::test]
async fn archived_products_remain_queryable() {
    let c = setup(ConcurrencyMode::LastWriteWins);
    let id = c
        .use_cases
        .create_product(CreateProductRequest::new("Anvil", "", Money::from_integer(250)))
        .await
        .unwrap()
        .product_id();
    c.clock.advance(Duration::minutes(1));
    c.use_cases.archive_product(id).await.unwrap();

    let view = c.queries.get_product(id, c.clock.now()).await.unwrap();
    assert_eq!(view.category, "uncategorized");
    assert_eq!(view.status, ProductStatus::Archived);
    assert_eq!(view.archived_at, Some(c.clock.now()));
    assert_eq!(outbox(&c.store).len(), 1);
}

#[tokio::test]
async fn optimistic_writers_cannot_overwrite_each_other() {
    let c = setup(ConcurrencyMode::Optimistic);
    let id = c
        .use_cases
        .create_product(CreateProductRequest::new("Vise", "tools", Money::from_integer(80)))
        .await
        .unwrap()
        .product_id();
    c.clock.advance(Duration::minutes(1));

    let mut first = c.repository.load(id).await.unwrap();
    let mut second = c.repository.load(id).await.unwrap();
    let now = c.clock.now();

    first.update(ProductUpdate::default().name("Bench Vise"), now).unwrap();
    second.update(ProductUpdate::default().category("workshop"), now + Duration::seconds(1)).unwrap();

    let mut plan = CommitPlan::new();
    plan.add_optional(c.repository.build_update_op(&first).unwrap());
    c.store.apply(plan).await.unwrap();

    let mut plan = CommitPlan::new();
    plan.add_optional(c.repository.build_update_op(&second).unwrap());
    assert!(c.store.apply(plan).await.is_err());

    let view = c.queries.get_product(id, now).await.unwrap();
    assert_eq!(view.name, "Bench Vise");
    assert_eq!(view.category, "tools");
}

#[tokio::test]
async fn reset_instance_can_commit_again_under_optimistic_mode() {
    let c = setup(ConcurrencyMode::Optimistic);
    c.clock.advance(Duration::microseconds(123_456));
    let id = c
        .use_cases
        .create_product(CreateProductRequest::new("Clamp", "tools", Money::from_integer(15)))
        .await
        .unwrap()
        .product_id();

    let mut product = c.repository.load(id).await.unwrap();
    let first = c.clock.now() + Duration::microseconds(1);
    product.update(ProductUpdate::default().name("F-Clamp"), first).unwrap();
    let mut plan = CommitPlan::new();
    plan.add_optional(c.repository.build_update_op(&product).unwrap());
    c.store.apply(plan).await.unwrap();

    product.reset_changes();
    assert_eq!(product.loaded_updated_at(), Some(first));

    product
        .update(ProductUpdate::default().category("clamps"), first + Duration::microseconds(1))
        .unwrap();
    let mut plan = CommitPlan::new();
    plan.add_optional(c.repository.build_update_op(&product).unwrap());
    c.store.apply(plan).await.unwrap();

    let view = c.queries.get_product(id, c.clock.now()).await.unwrap();
    assert_eq!(view.name, "F-Clamp");
    assert_eq!(view.category, "clamps");
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

fn product_strategy() -> impl Strategy<Value = Product> {
    (
        "[A-Za-z][A-Za-z0-9 ]{0,30}",
        "[ -~]{0,30}",
        "[a-z]{1,10}",
        1i64..10_000_000,
        1i64..10_000,
        prop::option::of((0i64..=100, 1i64..=8, 0i64..30, 1i64..30)),
        0u8..3,
    )
        .prop_map(|(name, description, category, numer, denom, discount, status)| {
            let mut product = Product::create(
                NewProduct {
                    name,
                    description,
                    category,
                    base_price: Money::new(numer, denom).unwrap(),
                },
                t0(),
            )
            .unwrap();
            let at = t0() + Duration::hours(1);
            if status >= 1 || discount.is_some() {
                product.activate(at).unwrap();
            }
            if let Some((n, d, before, after)) = discount {
                let discount = Discount::new(
                    Some(pct(n, d)),
                    at - Duration::days(before),
                    at + Duration::days(after),
                )
                .unwrap();
                product.apply_discount(discount, at).unwrap();
            }
            if status == 2 {
                product.archive(at + Duration::minutes(5)).unwrap();
            }
            product
        })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        ..ProptestConfig::default()
    })]

    /// Inserting any product and loading it back yields the same stored state.
    #[test]
    fn stored_products_round_trip(product in product_strategy()) {
        let c = setup(ConcurrencyMode::LastWriteWins);
        let loaded = block_on(async {
            let mut plan = CommitPlan::new();
            plan.add(c.repository.build_insert_op(&product).unwrap());
            c.store.apply(plan).await.unwrap();
            c.repository.load(product.product_id()).await.unwrap()
        });
        prop_assert_eq!(loaded.snapshot(), product.snapshot());
        prop_assert!(!loaded.changes().has_changes());
    }

    /// The read side prices a product exactly as the aggregate does.
    #[test]
    fn read_side_price_matches_aggregate(
        product in product_strategy(),
        offset_hours in -24i64 * 40..24 * 40,
    ) {
        let c = setup(ConcurrencyMode::LastWriteWins);
        let at = t0() + Duration::hours(1) + Duration::hours(offset_hours);
        let view = block_on(async {
            let mut plan = CommitPlan::new();
            plan.add(c.repository.build_insert_op(&product).unwrap());
            c.store.apply(plan).await.unwrap();
            c.queries.get_product(product.product_id(), at).await.unwrap()
        });
        prop_assert_eq!(view.effective_price, product.effective_price(at));
    }
}

#[tokio::test]
async fn unknown_ids_are_not_found_on_both_sides() {
    let c = setup(ConcurrencyMode::LastWriteWins);
    let id = ProductId::new();
    assert!(c.use_cases.activate_product(id).await.is_err());
    assert!(c.queries.get_product(id, t0()).await.is_err());
    assert_eq!(c.store.count(Table::Products).unwrap(), 0);
}
