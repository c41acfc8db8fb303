//! Translation store and provider.
//!
//! The provider owns the locale → dictionary store and the active locale.
//! It is either idle or loading: a request for a locale without a dictionary
//! runs the configured loader, and `is_loading()` stays true until every
//! outstanding load has finished, successfully or not.
//!
//! The store is an immutable snapshot behind an `Arc`. Merging a dictionary
//! swaps in a new snapshot, so readers never see a partially merged store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, warn};

use crate::catalog::{Messages, Resources};
use crate::config::{ChangeHook, I18nConfig, MissingKeyHook};
use crate::error::{I18nError, LoadError};
use crate::format::{create_locale_formatter, LocaleFormatter};
use crate::interpolate::interpolate;
use crate::loader::LocaleLoader;
use crate::locale::detect_locale_from;
use crate::vars::Variables;

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

fn lock<T>(lock: &Mutex<T>) -> MutexGuard<'_, T> {
    lock.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Outcome of an in-flight load; `None` until it finishes.
type Pending = watch::Receiver<Option<bool>>;

struct Inner {
    default_locale: String,
    locale: RwLock<String>,
    resources: RwLock<Arc<Resources>>,
    /// Number of loads in flight.
    loading: AtomicUsize,
    pending: Mutex<HashMap<String, Pending>>,
    formatter: RwLock<Option<LocaleFormatter>>,
    loader: Option<Arc<dyn LocaleLoader>>,
    on_missing_key: Option<MissingKeyHook>,
    on_change: Option<ChangeHook>,
    load_timeout: Option<Duration>,
}

/// Translation provider handle.
///
/// Cheap to clone; clones share the same store. Dropping the last clone
/// tears the store down.
#[derive(Clone)]
pub struct I18nProvider {
    inner: Arc<Inner>,
}

impl I18nProvider {
    /// Create a provider and pick its initial locale.
    ///
    /// With detection on, the host's language preferences are matched
    /// against the statically supplied locales; otherwise, or without a
    /// match, the default locale is active. No dictionary is loaded here;
    /// call [`ready`](Self::ready) for that.
    pub fn new(config: I18nConfig) -> Self {
        let I18nConfig {
            default_locale,
            resources,
            detect_locale,
            loader,
            on_missing_key,
            on_change,
            load_timeout,
            language_source,
        } = config;

        let detected = if detect_locale {
            let available: Vec<&str> = resources.keys().map(String::as_str).collect();
            detect_locale_from(language_source.as_ref(), &available)
        } else {
            None
        };
        let locale = detected.unwrap_or_else(|| default_locale.clone());
        debug!(
            locale = %locale,
            default_locale = %default_locale,
            detect_locale,
            "I18nProvider::new"
        );

        Self {
            inner: Arc::new(Inner {
                default_locale,
                locale: RwLock::new(locale),
                resources: RwLock::new(Arc::new(resources)),
                loading: AtomicUsize::new(0),
                pending: Mutex::new(HashMap::new()),
                formatter: RwLock::new(None),
                loader,
                on_missing_key,
                on_change,
                load_timeout,
            }),
        }
    }

    /// Create a provider and wait until it is [`ready`](Self::ready).
    pub async fn start(config: I18nConfig) -> Self {
        let provider = Self::new(config);
        provider.ready().await;
        provider
    }

    /// Make sure the active locale's dictionary, and the default locale's,
    /// are present, loading them if needed.
    ///
    /// A failed load is logged; the active locale is kept and lookups fall
    /// back to the default dictionary or the raw key.
    pub async fn ready(&self) {
        let locale = self.locale();
        if !self.ensure_locale(&locale).await {
            warn!(locale = %locale, "no dictionary available for the active locale");
        }

        let default = &self.inner.default_locale;
        if *default != locale && !self.ensure_locale(default).await {
            warn!(locale = %default, "no dictionary available for the default locale");
        }
    }

    /// The active locale.
    pub fn locale(&self) -> String {
        read(&self.inner.locale).clone()
    }

    pub fn default_locale(&self) -> &str {
        &self.inner.default_locale
    }

    /// Locales with a dictionary, static ones first, then in load order.
    pub fn available_locales(&self) -> Vec<String> {
        self.resources().keys().cloned().collect()
    }

    /// True while any dictionary load is in flight.
    pub fn is_loading(&self) -> bool {
        self.inner.loading.load(Ordering::SeqCst) > 0
    }

    pub fn has_locale(&self, locale: &str) -> bool {
        read(&self.inner.resources).contains_key(locale)
    }

    /// Current store snapshot.
    pub fn resources(&self) -> Arc<Resources> {
        Arc::clone(&read(&self.inner.resources))
    }

    /// Translate `key` in the active locale.
    ///
    /// Lookup order: active dictionary, then the default locale's. A key
    /// found in neither (or mapped to an empty template) calls the
    /// missing-key hook and is returned as-is.
    pub fn t(&self, key: &str, vars: &Variables) -> String {
        let locale = self.locale();
        let resources = self.resources();

        let template = resources
            .get(&locale)
            .and_then(|m| m.get(key))
            .or_else(|| {
                resources
                    .get(&self.inner.default_locale)
                    .and_then(|m| m.get(key))
            });

        match template {
            Some(t) if !t.is_empty() => interpolate(t, vars).into_owned(),
            _ => {
                if let Some(hook) = &self.inner.on_missing_key {
                    hook(key, &locale);
                }
                if cfg!(debug_assertions) {
                    warn!(key = %key, locale = %locale, "missing translation");
                }
                key.to_string()
            }
        }
    }

    /// Alias of [`t`](Self::t).
    pub fn translate(&self, key: &str, vars: &Variables) -> String {
        self.t(key, vars)
    }

    /// Switch the active locale.
    ///
    /// Does nothing when `next` is already active. Otherwise the locale only
    /// changes once its dictionary is present; if it cannot be loaded the
    /// request is dropped and the current locale stays.
    pub async fn set_locale(&self, next: &str) {
        let current = self.locale();
        if next == current {
            return;
        }

        if !self.ensure_locale(next).await {
            warn!(
                requested = %next,
                current = %current,
                "locale is unavailable, keeping the current locale"
            );
            return;
        }

        *write(&self.inner.locale) = next.to_string();
        debug!(from = %current, to = %next, "I18nProvider::set_locale");
        self.notify();
    }

    /// Merge a dictionary into the store, replacing any existing one for
    /// `locale`.
    pub fn add_messages(&self, locale: impl Into<String>, messages: Messages) {
        self.merge(locale.into(), messages);
    }

    /// Formatter bound to the active locale; rebuilt when the locale changes.
    pub fn formatter(&self) -> LocaleFormatter {
        let locale = self.locale();
        {
            let cached = read(&self.inner.formatter);
            if let Some(f) = cached.as_ref().filter(|f| f.locale() == locale) {
                return f.clone();
            }
        }
        let f = create_locale_formatter(&locale);
        *write(&self.inner.formatter) = Some(f.clone());
        f
    }

    /// Make sure `locale` has a dictionary, running the loader if needed.
    ///
    /// Returns whether the dictionary is present afterwards. Concurrent
    /// calls for the same locale share one loader invocation.
    pub async fn ensure_locale(&self, locale: &str) -> bool {
        enum Role {
            Leader(Arc<dyn LocaleLoader>, watch::Sender<Option<bool>>),
            Follower(Pending),
        }

        let role = {
            let mut pending = lock(&self.inner.pending);
            if self.has_locale(locale) {
                return true;
            }
            let Some(loader) = self.inner.loader.clone() else {
                return false;
            };
            match pending.get(locale) {
                Some(rx) => Role::Follower(rx.clone()),
                None => {
                    let (tx, rx) = watch::channel(None);
                    pending.insert(locale.to_string(), rx);
                    Role::Leader(loader, tx)
                }
            }
        };

        match role {
            Role::Follower(mut rx) => {
                debug!(locale = %locale, "joining in-flight load");
                let outcome = rx.wait_for(Option::is_some).await.map(|done| *done);
                match outcome {
                    Ok(done) => done == Some(true),
                    Err(_) => {
                        let err = I18nError::LocaleLoad {
                            locale: locale.to_string(),
                            source: LoadError::Abandoned,
                        };
                        warn!(locale = %locale, error = %err, "locale load abandoned");
                        false
                    }
                }
            }
            Role::Leader(loader, tx) => {
                let guard = LoadGuard::enter(self, locale);
                let ok = match self.fetch(loader.as_ref(), locale).await {
                    Ok(messages) => {
                        self.merge(locale.to_string(), messages);
                        true
                    }
                    Err(source) => {
                        let err = I18nError::LocaleLoad {
                            locale: locale.to_string(),
                            source,
                        };
                        error!(locale = %locale, error = %err, "locale load failed");
                        false
                    }
                };
                drop(guard);
                tx.send_replace(Some(ok));
                ok
            }
        }
    }

    async fn fetch(&self, loader: &dyn LocaleLoader, locale: &str) -> Result<Messages, LoadError> {
        let fut = loader.load(locale);
        let value = match self.inner.load_timeout {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .map_err(|_| LoadError::TimedOut(limit))??,
            None => fut.await?,
        };
        Messages::from_value(value).map_err(|e| LoadError::Malformed(e.to_string()))
    }

    fn merge(&self, locale: String, messages: Messages) {
        let entries = messages.len();
        {
            let mut resources = write(&self.inner.resources);
            // Readers holding the old snapshot keep it; they never see this write.
            Arc::make_mut(&mut resources).insert(locale.clone(), messages);
        }
        debug!(locale = %locale, entries, "merged dictionary");
        self.notify();
    }

    fn notify(&self) {
        if let Some(cb) = &self.inner.on_change {
            cb();
        }
    }
}

impl std::fmt::Debug for I18nProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("I18nProvider")
            .field("locale", &self.locale())
            .field("default_locale", &self.inner.default_locale)
            .field("available_locales", &self.available_locales())
            .field("is_loading", &self.is_loading())
            .finish()
    }
}

/// Marks one load as in flight for as long as it lives.
///
/// Dropping it (normally, or because the loading future was cancelled)
/// clears the pending slot and the loading count.
struct LoadGuard<'a> {
    provider: &'a I18nProvider,
    locale: &'a str,
}

impl<'a> LoadGuard<'a> {
    fn enter(provider: &'a I18nProvider, locale: &'a str) -> Self {
        provider.inner.loading.fetch_add(1, Ordering::SeqCst);
        debug!(locale = %locale, "idle -> loading");
        provider.notify();
        Self { provider, locale }
    }
}

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        let inner = &self.provider.inner;
        lock(&inner.pending).remove(self.locale);
        inner.loading.fetch_sub(1, Ordering::SeqCst);
        debug!(locale = %self.locale, "loading -> idle");
        self.provider.notify();
    }
}
