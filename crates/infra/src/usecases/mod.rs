//! Use-case interactors.
//!
//! Every interactor follows the same choreography: load (or construct) the
//! product, run exactly one transition, collect the state operation plus one
//! outbox operation per recorded event, and apply the plan atomically.
//! Recorded events are left on the returned product.

mod activate_product;
mod apply_discount;
mod archive_product;
mod create_product;
mod deactivate_product;
mod error;
mod remove_discount;
mod update_product;

pub use apply_discount::ApplyDiscountRequest;
pub use create_product::CreateProductRequest;
pub use error::UseCaseError;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use catalog_core::{AggregateRoot, Clock, ProductId};
use catalog_events::Metadata;
use catalog_products::{Product, ProductError, ProductEvent};

use crate::commit::{CommitPlan, Committer, Operation};
use crate::outbox::{JsonOutbox, OutboxSink};
use crate::repository::ProductRepository;

/// Entry point for all product write use cases.
#[derive(Clone)]
pub struct ProductUseCases {
    repository: Arc<dyn ProductRepository>,
    committer: Arc<dyn Committer>,
    outbox: Arc<dyn OutboxSink<ProductEvent>>,
    clock: Arc<dyn Clock>,
    metadata: Metadata,
}

impl ProductUseCases {
    pub fn new(
        repository: Arc<dyn ProductRepository>,
        committer: Arc<dyn Committer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            committer,
            outbox: Arc::new(JsonOutbox::new()),
            clock,
            metadata: Metadata::new(),
        }
    }

    pub fn with_outbox(mut self, outbox: Arc<dyn OutboxSink<ProductEvent>>) -> Self {
        self.outbox = outbox;
        self
    }

    /// Metadata attached to every outbox record written by these use cases.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// A handle for one caller: `metadata` is layered over the defaults, its
    /// entries winning. Stores and clock are shared with `self`.
    pub fn for_request(&self, metadata: &Metadata) -> Self {
        Self {
            metadata: self.metadata.merged(metadata),
            ..self.clone()
        }
    }

    /// Load, transition, commit.
    async fn modify<F>(
        &self,
        use_case: &'static str,
        id: ProductId,
        transition: F,
    ) -> Result<Product, UseCaseError>
    where
        F: FnOnce(&mut Product, DateTime<Utc>) -> Result<(), ProductError>,
    {
        let mut product = self.repository.load(id).await?;
        let now = self.clock.now();
        transition(&mut product, now)?;

        let state = self.repository.build_update_op(&product)?;
        self.commit(use_case, &product, state).await?;
        Ok(product)
    }

    async fn commit(
        &self,
        use_case: &'static str,
        product: &Product,
        state: Option<Operation>,
    ) -> Result<(), UseCaseError> {
        let mut plan = CommitPlan::new();
        plan.add_optional(state);
        for event in product.domain_events() {
            plan.add(self.outbox.build_insert_op(event, &self.metadata)?);
        }

        let product_id = product.product_id();
        if plan.is_empty() {
            debug!(use_case, %product_id, "nothing to commit");
            return Ok(());
        }

        let operations = plan.len();
        match self.committer.apply(plan).await {
            Ok(()) => {
                info!(
                    use_case,
                    %product_id,
                    operations,
                    events = product.domain_events().len(),
                    "use case committed"
                );
                Ok(())
            }
            Err(err) => {
                warn!(use_case, %product_id, operations, error = %err, "commit failed");
                Err(err.into())
            }
        }
    }
}
