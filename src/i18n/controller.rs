//! Locale controller

use std::{
    fmt,
    sync::{
        Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use futures::future::join_all;
use jiff::{SignedDuration, Timestamp};
use tracing::{debug, info, warn};

use crate::i18n::{
    cache::{Clock, DEFAULT_CACHE_TTL, TranslationCache},
    fetch::DictionaryFetcher,
    locale::{Locale, Namespace},
    preferences::{LOCALE_PREFERENCE_KEY, PreferenceStore},
};

/// Collaborators the controller talks to.
#[derive(Clone)]
pub struct I18nContext {
    /// Dictionary source
    pub fetcher: Arc<dyn DictionaryFetcher>,

    /// Time source for cache expiry
    pub clock: Arc<dyn Clock>,

    /// Where the selected locale is remembered
    pub preferences: Arc<dyn PreferenceStore>,
}

impl fmt::Debug for I18nContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("I18nContext").finish_non_exhaustive()
    }
}

/// How a failed batch load is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero is treated as one.
    pub max_attempts: u32,

    /// Pause between attempts
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_millis(250),
        }
    }
}

/// Controller tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderSettings {
    /// How long fetched dictionaries are trusted
    pub cache_ttl: SignedDuration,

    /// Batch retry behaviour
    pub retry: RetryPolicy,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_CACHE_TTL,
            retry: RetryPolicy::default(),
        }
    }
}

/// Where the controller is in its load cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// A batch load is in flight; lookups return their keys.
    Loading,

    /// The last batch load succeeded.
    Ready,

    /// The last batch load ran out of attempts.
    Degraded {
        /// Namespaces that never loaded
        failed: Vec<Namespace>,
    },
}

/// Result of a batch load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Every namespace is cached and fresh.
    Ready,

    /// Attempts were exhausted with these namespaces still missing.
    Degraded(Vec<Namespace>),

    /// A newer load started before this one settled.
    Superseded,
}

/// Result of a locale change request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocaleChange {
    /// Already on that locale; nothing happened.
    Unchanged,

    /// Switched and loaded.
    Switched(LoadOutcome),
}

#[derive(Debug)]
struct ControllerState {
    locale: Locale,
    status: LoadStatus,
    cache: TranslationCache,
}

/// Owns the selected locale and the translation cache.
///
/// Lookups through [`LocaleController::translate`] are synchronous and never
/// fail. Loads are asynchronous and tagged with a generation number: starting
/// a load supersedes any load still in flight, and only the newest load may
/// settle the status.
pub struct LocaleController {
    context: I18nContext,
    settings: LoaderSettings,
    state: RwLock<ControllerState>,
    generation: AtomicU64,
}

impl fmt::Debug for LocaleController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocaleController")
            .field("settings", &self.settings)
            .field("state", &self.state)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl LocaleController {
    /// Create a controller, picking the initial locale from the stored
    /// preference or, failing that, the given language tag.
    ///
    /// The controller starts out [`LoadStatus::Loading`]; call
    /// [`LocaleController::initialize`] to load the initial locale.
    pub fn new(context: I18nContext, settings: LoaderSettings, language_tag: Option<&str>) -> Self {
        let stored = context
            .preferences
            .load(LOCALE_PREFERENCE_KEY)
            .unwrap_or_else(|error| {
                warn!(%error, "failed to read stored locale");
                None
            });

        let locale = Locale::detect(stored.as_deref(), language_tag);

        debug!(%locale, stored = ?stored, language_tag, "detected initial locale");

        Self {
            context,
            settings,
            state: RwLock::new(ControllerState {
                locale,
                status: LoadStatus::Loading,
                cache: TranslationCache::new(),
            }),
            generation: AtomicU64::new(0),
        }
    }

    /// Load every namespace for the current locale.
    pub async fn initialize(&self) -> LoadOutcome {
        let (locale, generation) = {
            let mut state = self.write_state();
            (state.locale, self.begin_load(&mut state))
        };

        self.run_load(locale, generation).await
    }

    /// Currently selected locale
    pub fn locale(&self) -> Locale {
        self.read_state().locale
    }

    /// Current load status
    pub fn status(&self) -> LoadStatus {
        self.read_state().status.clone()
    }

    /// Whether a batch load is in flight
    pub fn is_loading(&self) -> bool {
        self.read_state().status == LoadStatus::Loading
    }

    /// When a namespace was last fetched for a locale, if ever.
    pub fn fetched_at(&self, locale: Locale, namespace: Namespace) -> Option<Timestamp> {
        self.read_state()
            .cache
            .get(locale, namespace)
            .map(|entry| entry.fetched_at)
    }

    /// Make sure a fresh dictionary is cached for `locale` and `namespace`,
    /// fetching it if it is missing or stale.
    ///
    /// Returns whether a fresh dictionary is now cached. Fetch failures are
    /// logged, not returned.
    pub async fn ensure_namespace_loaded(&self, locale: Locale, namespace: Namespace) -> bool {
        let now = self.context.clock.now();

        if self
            .read_state()
            .cache
            .fresh(locale, namespace, now, self.settings.cache_ttl)
            .is_some()
        {
            return true;
        }

        match self.context.fetcher.fetch(locale, namespace).await {
            Ok(dictionary) => {
                let fetched_at = self.context.clock.now();

                debug!(%locale, %namespace, entries = dictionary.len(), "cached dictionary");

                self.write_state()
                    .cache
                    .insert(locale, namespace, dictionary, fetched_at);

                true
            }
            Err(error) => {
                warn!(%locale, %namespace, %error, "failed to load dictionary");
                false
            }
        }
    }

    /// Load every namespace for `locale`, retrying the batch per the
    /// [`RetryPolicy`].
    ///
    /// For the current locale, any load still in flight is superseded and the
    /// status is `Loading` until this load settles, unless a newer load
    /// supersedes it first.
    ///
    /// Any other locale is only prefetched into the cache: the status and the
    /// in-flight load are left alone, and the outcome is just returned.
    pub async fn load_all_namespaces(&self, locale: Locale) -> LoadOutcome {
        let generation = {
            let mut state = self.write_state();

            if state.locale == locale {
                Some(self.begin_load(&mut state))
            } else {
                debug!(%locale, current = %state.locale, "prefetching inactive locale");
                None
            }
        };

        match generation {
            Some(generation) => self.run_load(locale, generation).await,
            None => self.load_batch(locale, None).await,
        }
    }

    /// Switch to `locale`, remember the choice and load its dictionaries.
    ///
    /// Asking for the current locale does nothing. Asking for a different one
    /// while a load is in flight supersedes that load.
    pub async fn set_locale(&self, locale: Locale) -> LocaleChange {
        let generation = {
            let mut state = self.write_state();

            if state.locale == locale {
                debug!(%locale, "locale unchanged");
                return LocaleChange::Unchanged;
            }

            info!(from = %state.locale, to = %locale, "switching locale");

            state.locale = locale;
            self.begin_load(&mut state)
        };

        if let Err(error) = self
            .context
            .preferences
            .save(LOCALE_PREFERENCE_KEY, locale.as_str())
        {
            warn!(%locale, %error, "failed to persist locale");
        }

        LocaleChange::Switched(self.run_load(locale, generation).await)
    }

    /// Translate a dotted `key` from `namespace` in the current locale.
    ///
    /// Falls back to the key itself while loading, or when the namespace is
    /// missing or stale, or the key is absent.
    pub fn translate(&self, key: &str, namespace: Namespace) -> String {
        let state = self.read_state();

        if state.status == LoadStatus::Loading {
            return key.to_string();
        }

        let locale = state.locale;
        let now = self.context.clock.now();

        let Some(entry) = state.cache.get(locale, namespace) else {
            warn!(%locale, %namespace, key, "namespace not loaded");
            return key.to_string();
        };

        if !entry.is_fresh(now, self.settings.cache_ttl) {
            warn!(%locale, %namespace, key, "namespace is stale");
            return key.to_string();
        }

        if let Some(text) = entry.dictionary.lookup(key) {
            text.to_string()
        } else {
            warn!(%locale, %namespace, key, "missing translation");
            key.to_string()
        }
    }

    fn begin_load(&self, state: &mut ControllerState) -> u64 {
        state.status = LoadStatus::Loading;

        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    async fn run_load(&self, locale: Locale, generation: u64) -> LoadOutcome {
        let outcome = self.load_batch(locale, Some(generation)).await;

        let mut state = self.write_state();

        if !self.is_current(generation) {
            debug!(%locale, generation, "load superseded");
            return LoadOutcome::Superseded;
        }

        match &outcome {
            LoadOutcome::Ready => {
                info!(%locale, "translations ready");
                state.status = LoadStatus::Ready;
            }
            LoadOutcome::Degraded(failed) => {
                warn!(%locale, failed = ?failed, "translations degraded");
                state.status = LoadStatus::Degraded {
                    failed: failed.clone(),
                };
            }
            LoadOutcome::Superseded => {}
        }

        outcome
    }

    /// Batch fetch with retries. Only a load with a `generation` can be
    /// superseded.
    async fn load_batch(&self, locale: Locale, generation: Option<u64>) -> LoadOutcome {
        let RetryPolicy {
            max_attempts,
            backoff,
        } = self.settings.retry;
        let attempts = max_attempts.max(1);
        let mut failed = Vec::new();

        for attempt in 1..=attempts {
            if generation.is_some_and(|generation| !self.is_current(generation)) {
                return LoadOutcome::Superseded;
            }

            let results = join_all(Namespace::ALL.into_iter().map(|namespace| async move {
                (
                    namespace,
                    self.ensure_namespace_loaded(locale, namespace).await,
                )
            }))
            .await;

            failed = results
                .into_iter()
                .filter_map(|(namespace, loaded)| (!loaded).then_some(namespace))
                .collect();

            if failed.is_empty() {
                return LoadOutcome::Ready;
            }

            warn!(%locale, attempt, attempts, failed = ?failed, "dictionary batch failed");

            if attempt < attempts && !backoff.is_zero() {
                tokio::time::sleep(backoff).await;
            }
        }

        LoadOutcome::Degraded(failed)
    }

    fn read_state(&self) -> RwLockReadGuard<'_, ControllerState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, ControllerState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use serde_json::json;
    use testresult::TestResult;

    use crate::i18n::{
        cache::ManualClock,
        dictionary::Dictionary,
        fetch::{FetchError, MockDictionaryFetcher},
        preferences::MemoryPreferenceStore,
    };

    use super::*;

    fn context(fetcher: MockDictionaryFetcher) -> I18nContext {
        I18nContext {
            fetcher: Arc::new(fetcher),
            clock: Arc::new(ManualClock::new(Timestamp::UNIX_EPOCH)),
            preferences: Arc::new(MemoryPreferenceStore::new()),
        }
    }

    fn no_backoff() -> LoaderSettings {
        LoaderSettings {
            retry: RetryPolicy {
                max_attempts: 3,
                backoff: Duration::ZERO,
            },
            ..LoaderSettings::default()
        }
    }

    fn common() -> Result<Dictionary, FetchError> {
        Ok(Dictionary::from_value(json!({
            "colorCard": { "popular": "Popular" }
        }))?)
    }

    fn offline() -> FetchError {
        FetchError::Io(std::io::Error::other("offline"))
    }

    #[test]
    fn starts_loading_with_detected_locale() {
        let controller = LocaleController::new(
            context(MockDictionaryFetcher::new()),
            LoaderSettings::default(),
            Some("vi-VN"),
        );

        assert_eq!(controller.locale(), Locale::Vi);
        assert!(controller.is_loading());
    }

    #[test]
    fn translate_returns_key_while_loading() {
        let controller = LocaleController::new(
            context(MockDictionaryFetcher::new()),
            LoaderSettings::default(),
            None,
        );

        assert_eq!(
            controller.translate("colorCard.popular", Namespace::Common),
            "colorCard.popular"
        );
    }

    #[tokio::test]
    async fn initialize_loads_every_namespace() {
        let mut fetcher = MockDictionaryFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|locale, _| *locale == Locale::En)
            .times(Namespace::ALL.len())
            .returning(|_, _| common());

        let controller = LocaleController::new(context(fetcher), no_backoff(), None);

        assert_eq!(controller.initialize().await, LoadOutcome::Ready);
        assert_eq!(controller.status(), LoadStatus::Ready);
        assert_eq!(
            controller.translate("colorCard.popular", Namespace::Common),
            "Popular"
        );
        assert_eq!(
            controller.translate("colorCard.missing", Namespace::Common),
            "colorCard.missing"
        );
    }

    #[tokio::test]
    async fn ensure_reports_fetch_failure() {
        let mut fetcher = MockDictionaryFetcher::new();
        fetcher.expect_fetch().times(1).returning(|_, _| Err(offline()));

        let controller = LocaleController::new(context(fetcher), no_backoff(), None);

        assert!(
            !controller
                .ensure_namespace_loaded(Locale::En, Namespace::Home)
                .await
        );
        assert_eq!(controller.fetched_at(Locale::En, Namespace::Home), None);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_expired_entry() -> TestResult {
        let home_calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&home_calls);

        let mut fetcher = MockDictionaryFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|_, namespace| *namespace == Namespace::Home)
            .times(2)
            .returning(move |_, _| {
                if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                    common()
                } else {
                    Err(offline())
                }
            });
        fetcher
            .expect_fetch()
            .withf(|_, namespace| *namespace != Namespace::Home)
            .times(Namespace::ALL.len() - 1)
            .returning(|_, _| common());

        let clock = Arc::new(ManualClock::new(Timestamp::UNIX_EPOCH));
        let controller = LocaleController::new(
            I18nContext {
                clock: clock.clone(),
                ..context(fetcher)
            },
            no_backoff(),
            None,
        );

        assert_eq!(controller.initialize().await, LoadOutcome::Ready);

        clock.advance(DEFAULT_CACHE_TTL)?;

        assert!(
            !controller
                .ensure_namespace_loaded(Locale::En, Namespace::Home)
                .await
        );
        assert_eq!(home_calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            controller.fetched_at(Locale::En, Namespace::Home),
            Some(Timestamp::UNIX_EPOCH)
        );
        assert_eq!(
            controller.translate("colorCard.popular", Namespace::Home),
            "colorCard.popular"
        );

        Ok(())
    }

    #[tokio::test]
    async fn batch_retries_only_failing_namespaces_then_degrades() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&attempts);

        let mut fetcher = MockDictionaryFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|_, namespace| *namespace == Namespace::Products)
            .times(3)
            .returning(move |_, _| {
                seen.fetch_add(1, Ordering::SeqCst);
                Err(offline())
            });
        fetcher
            .expect_fetch()
            .withf(|_, namespace| *namespace != Namespace::Products)
            .times(Namespace::ALL.len() - 1)
            .returning(|_, _| common());

        let controller = LocaleController::new(context(fetcher), no_backoff(), None);

        assert_eq!(
            controller.initialize().await,
            LoadOutcome::Degraded(vec![Namespace::Products])
        );
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert_eq!(
            controller.status(),
            LoadStatus::Degraded {
                failed: vec![Namespace::Products]
            }
        );
        assert_eq!(
            controller.translate("colorCard.popular", Namespace::Common),
            "Popular"
        );
        assert_eq!(
            controller.translate("colorCard.popular", Namespace::Products),
            "colorCard.popular"
        );
    }

    #[tokio::test]
    async fn batch_recovers_on_retry() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);

        let mut fetcher = MockDictionaryFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|_, namespace| *namespace == Namespace::Home)
            .times(2)
            .returning(move |_, _| {
                if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(offline())
                } else {
                    common()
                }
            });
        fetcher
            .expect_fetch()
            .withf(|_, namespace| *namespace != Namespace::Home)
            .times(Namespace::ALL.len() - 1)
            .returning(|_, _| common());

        let controller = LocaleController::new(context(fetcher), no_backoff(), None);

        assert_eq!(controller.initialize().await, LoadOutcome::Ready);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn zero_attempts_still_tries_once() {
        let mut fetcher = MockDictionaryFetcher::new();
        fetcher
            .expect_fetch()
            .times(Namespace::ALL.len())
            .returning(|_, _| Err(offline()));

        let settings = LoaderSettings {
            retry: RetryPolicy {
                max_attempts: 0,
                backoff: Duration::ZERO,
            },
            ..LoaderSettings::default()
        };

        let controller = LocaleController::new(context(fetcher), settings, None);

        assert_eq!(
            controller.initialize().await,
            LoadOutcome::Degraded(Namespace::ALL.to_vec())
        );
    }

    #[tokio::test]
    async fn prefetching_other_locale_leaves_status_alone() {
        let mut fetcher = MockDictionaryFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|locale, _| *locale == Locale::En)
            .times(Namespace::ALL.len())
            .returning(|_, _| common());
        fetcher
            .expect_fetch()
            .withf(|locale, _| *locale == Locale::Vi)
            .times(3 * Namespace::ALL.len())
            .returning(|_, _| Err(offline()));

        let controller = LocaleController::new(context(fetcher), no_backoff(), None);

        assert_eq!(controller.initialize().await, LoadOutcome::Ready);
        assert_eq!(
            controller.load_all_namespaces(Locale::Vi).await,
            LoadOutcome::Degraded(Namespace::ALL.to_vec())
        );
        assert_eq!(controller.locale(), Locale::En);
        assert_eq!(controller.status(), LoadStatus::Ready);
        assert_eq!(
            controller.translate("colorCard.popular", Namespace::Common),
            "Popular"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_only_between_attempts() {
        let mut fetcher = MockDictionaryFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|_, namespace| *namespace == Namespace::Products)
            .times(3)
            .returning(|_, _| Err(offline()));
        fetcher
            .expect_fetch()
            .withf(|_, namespace| *namespace != Namespace::Products)
            .times(Namespace::ALL.len() - 1)
            .returning(|_, _| common());

        let controller = LocaleController::new(context(fetcher), LoaderSettings::default(), None);
        let started = tokio::time::Instant::now();

        assert_eq!(
            controller.initialize().await,
            LoadOutcome::Degraded(vec![Namespace::Products])
        );

        // Two pauses of 250ms for three attempts, none after the last.
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(500), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(750), "{elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn first_try_success_never_pauses() {
        let mut fetcher = MockDictionaryFetcher::new();
        fetcher
            .expect_fetch()
            .times(Namespace::ALL.len())
            .returning(|_, _| common());

        let controller = LocaleController::new(context(fetcher), LoaderSettings::default(), None);
        let started = tokio::time::Instant::now();

        assert_eq!(controller.initialize().await, LoadOutcome::Ready);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }
}
