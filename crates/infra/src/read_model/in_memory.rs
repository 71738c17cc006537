use std::sync::Arc;

use chrono::{DateTime, Utc};

use catalog_core::ProductId;
use catalog_products::ProductStatus;

use super::{Pagination, ProductFilter, ProductPage, ProductQueries, ProductView, ReadModelError};
use crate::commit::{InMemoryStore, Table};
use crate::repository::ProductRow;

/// Queries over the shared `InMemoryStore`. Intended for tests/dev.
#[derive(Debug, Clone)]
pub struct InMemoryProductQueries {
    store: Arc<InMemoryStore>,
}

impl InMemoryProductQueries {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }

    fn all_rows(&self) -> Result<Vec<ProductRow>, ReadModelError> {
        self.store
            .rows(Table::Products)
            .map_err(|e| ReadModelError::Storage(e.to_string()))?
            .iter()
            .map(|row| ProductRow::from_stored(row).map_err(|e| ReadModelError::Corrupt(e.to_string())))
            .collect()
    }
}

#[async_trait::async_trait]
impl ProductQueries for InMemoryProductQueries {
    async fn get_product(&self, id: ProductId, now: DateTime<Utc>) -> Result<ProductView, ReadModelError> {
        let row = self
            .store
            .row(Table::Products, &id.to_string())
            .map_err(|e| ReadModelError::Storage(e.to_string()))?
            .ok_or(ReadModelError::NotFound(id))?;
        let row = ProductRow::from_stored(&row).map_err(|e| ReadModelError::Corrupt(e.to_string()))?;
        ProductView::from_row(row, now)
    }

    async fn list_products(
        &self,
        filter: ProductFilter,
        pagination: Pagination,
        now: DateTime<Utc>,
    ) -> Result<ProductPage, ReadModelError> {
        let mut rows: Vec<ProductRow> = self
            .all_rows()?
            .into_iter()
            .filter(|row| {
                row.status
                    .parse::<ProductStatus>()
                    .is_ok_and(|status| filter.matches(&row.category, status))
            })
            .collect();
        rows.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.product_id.cmp(&b.product_id))
        });

        let total = rows.len() as u64;
        let items = rows
            .into_iter()
            .skip(pagination.offset as usize)
            .take(pagination.limit as usize)
            .map(|row| ProductView::from_row(row, now))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ProductPage::new(items, total, pagination))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::{CommitPlan, Committer};
    use crate::repository::ProductMapper;
    use catalog_core::{BigInt, BigRational, Money};
    use catalog_products::{Discount, NewProduct, Product};
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 18, 12, 0, 0).unwrap()
    }

    fn product(name: &str, category: &str, created: DateTime<Utc>) -> Product {
        Product::create(
            NewProduct {
                name: name.into(),
                description: String::new(),
                category: category.into(),
                base_price: Money::from_integer(100),
            },
            created,
        )
        .unwrap()
    }

    async fn seed(store: &InMemoryStore, products: &[Product]) {
        let mut plan = CommitPlan::new();
        for p in products {
            plan.add(ProductMapper::default().insert_op(p).unwrap());
        }
        store.apply(plan).await.unwrap();
    }

    #[tokio::test]
    async fn get_product_derives_prices_at_the_given_instant() {
        let store = Arc::new(InMemoryStore::new());
        let mut p = product("Lamp", "home", t0());
        p.activate(t0()).unwrap();
        let end = t0() + Duration::days(1);
        p.apply_discount(
            Discount::new(Some(BigRational::from_integer(BigInt::from(25))), t0(), end).unwrap(),
            t0(),
        )
        .unwrap();
        seed(&store, &[p.clone()]).await;

        let queries = InMemoryProductQueries::new(store);
        let during = queries.get_product(p.product_id(), end).await.unwrap();
        assert_eq!(during.effective_price, Money::from_integer(75));
        assert_eq!(during.effective_price, p.effective_price(end));
        assert_eq!(during.discount_amount, Some(Money::from_integer(25)));
        assert_eq!(during.status, ProductStatus::Active);

        let after = queries
            .get_product(p.product_id(), end + Duration::seconds(1))
            .await
            .unwrap();
        assert_eq!(after.effective_price, Money::from_integer(100));
        assert!(after.discount.as_ref().is_some_and(|d| !d.active));
    }

    #[tokio::test]
    async fn get_missing_product_is_not_found() {
        let queries = InMemoryProductQueries::new(Arc::new(InMemoryStore::new()));
        let id = ProductId::new();
        assert_eq!(queries.get_product(id, t0()).await, Err(ReadModelError::NotFound(id)));
    }

    #[tokio::test]
    async fn list_filters_orders_and_pages() {
        let store = Arc::new(InMemoryStore::new());
        let products: Vec<Product> = (0..5)
            .map(|i| {
                let category = if i % 2 == 0 { "tools" } else { "garden" };
                product(&format!("P{i}"), category, t0() + Duration::minutes(i))
            })
            .collect();
        seed(&store, &products).await;
        let queries = InMemoryProductQueries::new(store);

        let tools = ProductFilter {
            category: Some("tools".into()),
            status: None,
        };
        let page = queries
            .list_products(tools.clone(), Pagination::new(Some(2), None), t0())
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        assert!(page.has_more);
        let names: Vec<_> = page.items.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["P4", "P2"]);

        let rest = queries
            .list_products(tools, Pagination::new(Some(2), Some(2)), t0())
            .await
            .unwrap();
        assert_eq!(rest.items.len(), 1);
        assert!(!rest.has_more);

        let active = ProductFilter {
            category: None,
            status: Some(ProductStatus::Active),
        };
        let none = queries
            .list_products(active, Pagination::default(), t0())
            .await
            .unwrap();
        assert_eq!(none.total, 0);
    }
}
