use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use catalog_core::{AggregateRoot, BigInt, BigRational, FixedClock, Money};
use catalog_events::Metadata;
use catalog_infra::commit::{CommitPlan, Committer, InMemoryStore};
use catalog_infra::outbox::{JsonOutbox, OutboxSink};
use catalog_infra::read_model::{InMemoryProductQueries, Pagination, ProductFilter, ProductQueries};
use catalog_infra::repository::{ConcurrencyMode, InMemoryProductRepository, ProductMapper};
use catalog_infra::usecases::{ApplyDiscountRequest, CreateProductRequest, ProductUseCases};
use catalog_products::{NewProduct, Product, ProductUpdate};
use tokio::runtime::Runtime;

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread().build().unwrap()
}

fn setup() -> (Arc<InMemoryStore>, Arc<FixedClock>, ProductUseCases) {
    let store = Arc::new(InMemoryStore::new());
    let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()));
    let repository = Arc::new(InMemoryProductRepository::new(
        store.clone(),
        ProductMapper::new(ConcurrencyMode::Optimistic),
    ));
    let use_cases = ProductUseCases::new(repository, store.clone(), clock.clone())
        .with_metadata(Metadata::new().with("user_id", "bench").with("company_id", "bench"));
    (store, clock, use_cases)
}

fn sample_product(i: usize) -> Product {
    Product::create(
        NewProduct {
            name: format!("Product {i}"),
            description: "benchmark".to_string(),
            category: "tools".to_string(),
            base_price: Money::new(1999 + i as i64, 100).unwrap(),
        },
        Utc::now(),
    )
    .unwrap()
}

/// Building state + outbox operations without touching storage.
fn bench_plan_building(c: &mut Criterion) {
    let mapper = ProductMapper::new(ConcurrencyMode::Optimistic);
    let metadata = Metadata::new().with("user_id", "bench");
    let outbox = JsonOutbox::new();

    c.bench_function("plan_building/create", |b| {
        let product = sample_product(0);
        b.iter(|| {
            let mut plan = CommitPlan::new();
            plan.add(mapper.insert_op(black_box(&product)).unwrap());
            for event in product.domain_events() {
                plan.add(outbox.build_insert_op(event, &metadata).unwrap());
            }
            black_box(plan)
        });
    });

    c.bench_function("plan_building/update", |b| {
        let mut product = sample_product(0);
        product.reset_changes();
        product
            .update(ProductUpdate::default().name("Renamed").category("garden"), Utc::now())
            .unwrap();
        b.iter(|| black_box(mapper.update_op(black_box(&product)).unwrap()));
    });
}

/// Full interactor latency against the in-memory committer.
fn bench_use_case_latency(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("use_case_latency");

    group.bench_function("create_product", |b| {
        let (_store, _clock, use_cases) = setup();
        let mut i = 0i64;
        b.iter(|| {
            i += 1;
            let request = CreateProductRequest::new("Drill", "tools", Money::from_integer(100 + i));
            rt.block_on(use_cases.create_product(request)).unwrap()
        });
    });

    group.bench_function("activate_deactivate", |b| {
        let (_store, clock, use_cases) = setup();
        let id = rt
            .block_on(use_cases.create_product(CreateProductRequest::new(
                "Drill",
                "tools",
                Money::from_integer(100),
            )))
            .unwrap()
            .product_id();
        b.iter(|| {
            clock.advance(Duration::milliseconds(1));
            rt.block_on(use_cases.activate_product(id)).unwrap();
            clock.advance(Duration::milliseconds(1));
            rt.block_on(use_cases.deactivate_product(id)).unwrap();
        });
    });

    group.bench_function("discount_apply_remove", |b| {
        let (_store, clock, use_cases) = setup();
        let id = rt
            .block_on(use_cases.create_product(CreateProductRequest::new(
                "Drill",
                "tools",
                Money::from_integer(100),
            )))
            .unwrap()
            .product_id();
        rt.block_on(use_cases.activate_product(id)).unwrap();
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        b.iter(|| {
            clock.advance(Duration::milliseconds(1));
            let request = ApplyDiscountRequest::new(
                BigRational::new(BigInt::from(25), BigInt::from(2)),
                start,
                end,
            );
            rt.block_on(use_cases.apply_discount(id, request)).unwrap();
            clock.advance(Duration::milliseconds(1));
            rt.block_on(use_cases.remove_discount(id)).unwrap();
        });
    });

    group.finish();
}

/// Cost of the all-or-nothing staging as the store grows.
fn bench_commit_by_store_size(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("commit_by_store_size");
    let mapper = ProductMapper::new(ConcurrencyMode::LastWriteWins);

    for size in [10usize, 100, 1_000] {
        let store = InMemoryStore::new();
        for i in 0..size {
            let mut plan = CommitPlan::new();
            plan.add(mapper.insert_op(&sample_product(i)).unwrap());
            rt.block_on(store.apply(plan)).unwrap();
        }

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            let mut i = size;
            b.iter(|| {
                i += 1;
                let mut plan = CommitPlan::new();
                plan.add(mapper.insert_op(&sample_product(i)).unwrap());
                rt.block_on(store.apply(plan)).unwrap();
            });
        });
    }

    group.finish();
}

fn bench_list_products(c: &mut Criterion) {
    let rt = runtime();
    let (store, _clock, use_cases) = setup();
    for i in 0..500 {
        let category = if i % 2 == 0 { "tools" } else { "garden" };
        rt.block_on(use_cases.create_product(CreateProductRequest::new(
            format!("Product {i}"),
            category,
            Money::from_integer(10),
        )))
        .unwrap();
    }
    let queries = InMemoryProductQueries::new(store);
    let now = Utc::now();

    c.bench_function("list_products/500_filtered", |b| {
        b.iter(|| {
            let filter = ProductFilter {
                category: Some("tools".to_string()),
                status: None,
            };
            rt.block_on(queries.list_products(filter, Pagination::default(), now)).unwrap()
        });
    });
}

criterion_group!(
    benches,
    bench_plan_building,
    bench_use_case_latency,
    bench_commit_by_store_size,
    bench_list_products
);
criterion_main!(benches);
