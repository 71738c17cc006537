//! Environment-driven process configuration.

use thiserror::Error;

use catalog_core::{Classify, ErrorKind};
use catalog_events::Metadata;

use crate::repository::ConcurrencyMode;

pub const USE_PERSISTENT_STORES: &str = "USE_PERSISTENT_STORES";
pub const DATABASE_URL: &str = "DATABASE_URL";
pub const DATABASE_MAX_CONNECTIONS: &str = "DATABASE_MAX_CONNECTIONS";
pub const CATALOG_CONCURRENCY: &str = "CATALOG_CONCURRENCY";
pub const CATALOG_DEFAULT_ACTOR: &str = "CATALOG_DEFAULT_ACTOR";
pub const CATALOG_DEFAULT_TENANT: &str = "CATALOG_DEFAULT_TENANT";

const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_ACTOR: &str = "system";
const DEFAULT_TENANT: &str = "default";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

impl Classify for ConfigError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidInput
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// `None` selects the in-memory stores.
    pub database: Option<DatabaseConfig>,
    pub concurrency: ConcurrencyMode,
    pub default_actor: String,
    pub default_tenant: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let use_persistent = match lookup(USE_PERSISTENT_STORES) {
            None => false,
            Some(value) => value
                .trim()
                .parse::<bool>()
                .map_err(|_| invalid(USE_PERSISTENT_STORES, value))?,
        };

        let database = if use_persistent {
            let url = lookup(DATABASE_URL)
                .filter(|url| !url.trim().is_empty())
                .ok_or(ConfigError::Missing(DATABASE_URL))?;
            let max_connections = match lookup(DATABASE_MAX_CONNECTIONS) {
                None => DEFAULT_MAX_CONNECTIONS,
                Some(value) => match value.trim().parse::<u32>() {
                    Ok(n) if n > 0 => n,
                    _ => return Err(invalid(DATABASE_MAX_CONNECTIONS, value)),
                },
            };
            Some(DatabaseConfig { url, max_connections })
        } else {
            None
        };

        let concurrency = match lookup(CATALOG_CONCURRENCY) {
            None => ConcurrencyMode::default(),
            Some(value) => value
                .trim()
                .parse::<ConcurrencyMode>()
                .map_err(|_| invalid(CATALOG_CONCURRENCY, value))?,
        };

        Ok(Self {
            database,
            concurrency,
            default_actor: non_blank(lookup(CATALOG_DEFAULT_ACTOR), DEFAULT_ACTOR),
            default_tenant: non_blank(lookup(CATALOG_DEFAULT_TENANT), DEFAULT_TENANT),
        })
    }

    pub fn use_persistent_stores(&self) -> bool {
        self.database.is_some()
    }

    /// Metadata stamped on every outbox record when the caller supplies none.
    pub fn default_metadata(&self) -> Metadata {
        Metadata::new()
            .with("user_id", self.default_actor.as_str())
            .with("company_id", self.default_tenant.as_str())
    }
}

fn invalid(key: &'static str, value: String) -> ConfigError {
    ConfigError::Invalid { key, value }
}

fn non_blank(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}
