use catalog_core::ProductId;
use catalog_products::Product;

use super::{ProductUseCases, UseCaseError};

impl ProductUseCases {
    /// Persists the archived status and `archived_at`. Archiving records no
    /// domain event, so no outbox record is written.
    pub async fn archive_product(&self, id: ProductId) -> Result<Product, UseCaseError> {
        self.modify("archive_product", id, |product, now| product.archive(now))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::{Table, Value};
    use crate::usecases::fixtures::Harness;
    use catalog_products::{ProductError, ProductUpdate};

    #[tokio::test]
    async fn archive_persists_timestamp_without_outbox_record() {
        let h = Harness::new();
        let id = h.create_active("Hammer").await;
        let at = h.clock_now();

        h.use_cases.archive_product(id).await.unwrap();

        let row = h.store.row(Table::Products, &id.to_string()).unwrap().unwrap();
        assert_eq!(row.get("status"), Some(&Value::text("archived")));
        assert_eq!(row.get("archived_at"), Some(&Value::timestamp(at)));
        assert_eq!(h.event_types(), vec!["product.created", "product.activated"]);
    }

    #[tokio::test]
    async fn archived_products_reject_further_changes() {
        let h = Harness::new();
        let id = h.create("Hammer").await.product_id();
        h.use_cases.archive_product(id).await.unwrap();

        let archived = |err: UseCaseError| matches!(err, UseCaseError::Domain(ProductError::ProductArchived { .. }));
        assert!(archived(h.use_cases.archive_product(id).await.unwrap_err()));
        assert!(archived(h.use_cases.activate_product(id).await.unwrap_err()));
        assert!(archived(
            h.use_cases
                .update_product(id, ProductUpdate::default().name("Mallet"))
                .await
                .unwrap_err()
        ));
        assert_eq!(h.outbox_len(), 1);
    }
}
