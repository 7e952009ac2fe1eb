//! Internationalisation
//!
//! Translation dictionaries are split into [`Namespace`]s and fetched per
//! [`Locale`] through a [`DictionaryFetcher`]. The [`LocaleController`] keeps
//! them in a time-limited [`TranslationCache`], remembers the selected locale
//! in a [`PreferenceStore`] and answers lookups synchronously.

pub mod cache;
pub mod controller;
pub mod dictionary;
pub mod fetch;
pub mod locale;
pub mod preferences;

pub use cache::{CacheEntry, Clock, DEFAULT_CACHE_TTL, ManualClock, SystemClock, TranslationCache};
pub use controller::{
    I18nContext, LoadOutcome, LoadStatus, LoaderSettings, LocaleChange, LocaleController,
    RetryPolicy,
};
pub use dictionary::Dictionary;
pub use fetch::{DictionaryFetcher, DirectoryFetcher, FetchError, HttpFetcher};
pub use locale::{Locale, Namespace, ParseError};
pub use preferences::{
    FilePreferenceStore, LOCALE_PREFERENCE_KEY, MemoryPreferenceStore, PreferenceError,
    PreferenceStore,
};
