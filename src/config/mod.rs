//! Configuration
//!
//! Settings come from CLI arguments and the environment, with `.env` loaded
//! first when present.

use thiserror::Error;

pub mod i18n;
pub mod observability;

pub use i18n::I18nConfig;
pub use observability::{LogFormat, LoggingConfig};

/// Invalid configuration values
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Cache TTL is zero or too large
    #[error("cache TTL must be between 1 and {max} seconds, got {0}", max = i64::MAX)]
    InvalidCacheTtl(u64),
}

/// Load `.env` into the process environment if present.
pub fn load_dotenv() {
    _ = dotenvy::dotenv();
}
