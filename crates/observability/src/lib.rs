//! Process-wide logging setup shared by the catalog binaries.

pub mod tracing;

pub use crate::tracing::{LogConfig, LogFormat};

/// Initialize logging from `RUST_LOG` / `LOG_FORMAT`.
///
/// Safe to call multiple times; later calls are no-ops.
pub fn init() {
    tracing::init(LogConfig::from_env());
}
