use thiserror::Error;

use catalog_core::{Classify, ErrorKind};
use catalog_products::ProductError;

use crate::commit::CommitError;
use crate::outbox::OutboxError;
use crate::repository::RepositoryError;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error returned by every interactor.
///
/// Domain errors pass through unchanged. Infrastructure failures display as
/// an opaque message; the cause stays reachable through `source()` for logging.
#[derive(Debug, Error)]
pub enum UseCaseError {
    #[error(transparent)]
    Domain(#[from] ProductError),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("product {key} was modified concurrently")]
    Conflict { key: String },

    #[error("internal storage error")]
    Infrastructure {
        #[source]
        source: BoxError,
    },
}

impl UseCaseError {
    fn infrastructure(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        UseCaseError::Infrastructure {
            source: Box::new(err),
        }
    }

    pub fn is_domain(&self) -> bool {
        self.kind().is_domain()
    }
}

impl Classify for UseCaseError {
    fn kind(&self) -> ErrorKind {
        match self {
            UseCaseError::Domain(err) => err.kind(),
            UseCaseError::InvalidInput(_) => ErrorKind::InvalidInput,
            UseCaseError::Conflict { .. } => ErrorKind::Conflict,
            UseCaseError::Infrastructure { .. } => ErrorKind::Infrastructure,
        }
    }
}

impl From<RepositoryError> for UseCaseError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(id) => UseCaseError::Domain(ProductError::NotFound(id)),
            RepositoryError::PriceOutOfRange { .. } => UseCaseError::InvalidInput(err.to_string()),
            RepositoryError::Corrupt { .. } | RepositoryError::Storage(_) => {
                UseCaseError::infrastructure(err)
            }
        }
    }
}

impl From<CommitError> for UseCaseError {
    fn from(err: CommitError) -> Self {
        match err {
            CommitError::Conflict { key, .. } => UseCaseError::Conflict { key },
            other => UseCaseError::infrastructure(other),
        }
    }
}

impl From<OutboxError> for UseCaseError {
    fn from(err: OutboxError) -> Self {
        UseCaseError::infrastructure(err)
    }
}
