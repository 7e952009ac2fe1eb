//! Translation cache

use std::sync::{Mutex, PoisonError};

use jiff::{SignedDuration, Timestamp};
use rustc_hash::FxHashMap;

use crate::i18n::{
    dictionary::Dictionary,
    locale::{Locale, Namespace},
};

/// How long a fetched dictionary is trusted.
pub const DEFAULT_CACHE_TTL: SignedDuration = SignedDuration::from_secs(5 * 60);

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// The current instant
    fn now(&self) -> Timestamp;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Timestamp>,
}

impl ManualClock {
    /// Create a clock stopped at `now`.
    pub fn new(now: Timestamp) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Move the clock forward (or backward, for a negative duration).
    ///
    /// # Errors
    ///
    /// Returns an error if the result is outside the supported timestamp range.
    pub fn advance(&self, by: SignedDuration) -> Result<(), jiff::Error> {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now = now.checked_add(by)?;

        Ok(())
    }

    /// Jump to an instant.
    pub fn set(&self, to: Timestamp) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A fetched dictionary and when it was fetched
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// Dictionary contents
    pub dictionary: Dictionary,

    /// Fetch time
    pub fetched_at: Timestamp,
}

impl CacheEntry {
    /// Whether the entry can still be trusted at `now`.
    pub fn is_fresh(&self, now: Timestamp, ttl: SignedDuration) -> bool {
        now.duration_since(self.fetched_at) < ttl
    }
}

/// Dictionaries by locale and namespace
#[derive(Debug, Default)]
pub struct TranslationCache {
    entries: FxHashMap<(Locale, Namespace), CacheEntry>,
}

impl TranslationCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry for a locale and namespace, fresh or not.
    pub fn get(&self, locale: Locale, namespace: Namespace) -> Option<&CacheEntry> {
        self.entries.get(&(locale, namespace))
    }

    /// Dictionary for a locale and namespace, if present and still fresh.
    pub fn fresh(
        &self,
        locale: Locale,
        namespace: Namespace,
        now: Timestamp,
        ttl: SignedDuration,
    ) -> Option<&Dictionary> {
        self.get(locale, namespace)
            .filter(|entry| entry.is_fresh(now, ttl))
            .map(|entry| &entry.dictionary)
    }

    /// Store a dictionary, replacing any previous entry.
    pub fn insert(
        &mut self,
        locale: Locale,
        namespace: Namespace,
        dictionary: Dictionary,
        fetched_at: Timestamp,
    ) {
        self.entries.insert(
            (locale, namespace),
            CacheEntry {
                dictionary,
                fetched_at,
            },
        );
    }

    /// Number of cached dictionaries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
