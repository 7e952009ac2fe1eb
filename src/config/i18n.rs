//! Translation loading config

use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::Args;
use jiff::SignedDuration;

use crate::{
    config::ConfigError,
    i18n::{
        DictionaryFetcher, DirectoryFetcher, FilePreferenceStore, HttpFetcher, I18nContext,
        LoaderSettings, LocaleController, RetryPolicy, SystemClock,
    },
};

/// Translation loading settings.
#[derive(Debug, Clone, Args)]
pub struct I18nConfig {
    /// Directory holding `{locale}/{namespace}.json` dictionaries
    #[arg(long, env = "VENEER_LOCALES_DIR", default_value = "./locales", global = true)]
    pub locales_dir: PathBuf,

    /// Base URL to request dictionaries from; overrides the locales directory
    #[arg(long, env = "VENEER_LOCALES_URL", global = true)]
    pub locales_url: Option<String>,

    /// Seconds a fetched dictionary is trusted
    #[arg(long, env = "VENEER_CACHE_TTL_SECS", default_value_t = 300, global = true)]
    pub cache_ttl_secs: u64,

    /// Attempts per batch load, including the first
    #[arg(long, env = "VENEER_RETRY_ATTEMPTS", default_value_t = 3, global = true)]
    pub retry_attempts: u32,

    /// Milliseconds to wait between batch attempts
    #[arg(long, env = "VENEER_RETRY_BACKOFF_MS", default_value_t = 250, global = true)]
    pub retry_backoff_ms: u64,

    /// File the selected locale is remembered in
    #[arg(
        long,
        env = "VENEER_PREFERENCES",
        default_value = "./.veneer/preferences.json",
        global = true
    )]
    pub preferences_path: PathBuf,

    /// Language tag used when no locale has been stored (e.g. `vi_VN.UTF-8`)
    #[arg(long, env = "LANG", global = true)]
    pub language_tag: Option<String>,
}

impl I18nConfig {
    /// Loader tuning
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidCacheTtl`] for a zero or out of range TTL.
    pub fn settings(&self) -> Result<LoaderSettings, ConfigError> {
        let ttl_secs = i64::try_from(self.cache_ttl_secs)
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or(ConfigError::InvalidCacheTtl(self.cache_ttl_secs))?;

        Ok(LoaderSettings {
            cache_ttl: SignedDuration::from_secs(ttl_secs),
            retry: RetryPolicy {
                max_attempts: self.retry_attempts,
                backoff: Duration::from_millis(self.retry_backoff_ms),
            },
        })
    }

    /// Production collaborators: HTTP or directory fetcher, wall clock and
    /// file-backed preferences.
    pub fn context(&self) -> I18nContext {
        let fetcher: Arc<dyn DictionaryFetcher> = match &self.locales_url {
            Some(url) => Arc::new(HttpFetcher::new(url.clone())),
            None => Arc::new(DirectoryFetcher::new(self.locales_dir.clone())),
        };

        I18nContext {
            fetcher,
            clock: Arc::new(SystemClock),
            preferences: Arc::new(FilePreferenceStore::new(self.preferences_path.clone())),
        }
    }

    /// Build a controller from this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the loader settings are invalid.
    pub fn controller(&self) -> Result<LocaleController, ConfigError> {
        Ok(LocaleController::new(
            self.context(),
            self.settings()?,
            self.language_tag.as_deref(),
        ))
    }
}
