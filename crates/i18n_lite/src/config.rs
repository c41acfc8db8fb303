use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::catalog::{Messages, Resources};
use crate::error::I18nError;
use crate::loader::{CatalogDirLoader, LocaleLoader};
use crate::locale::{LanguageSource, SystemLanguages};

/// Called with `(key, locale)` when a translation key cannot be resolved.
pub type MissingKeyHook = Arc<dyn Fn(&str, &str) + Send + Sync>;

/// Called after every committed provider change (locale, resources, loading).
///
/// The app should set this to something that schedules a UI rebuild.
pub type ChangeHook = Arc<dyn Fn() + Send + Sync>;

/// Provider configuration.
///
/// Only the default locale is required:
///
/// ```ignore
/// let config = I18nConfig::new("en")
///     .messages("en", Messages::new().with("welcome", "Welcome, {{name}}!"))
///     .loader(loader_fn(|locale| async move { fetch(&locale).await }))
///     .on_missing_key(|key, locale| eprintln!("missing {key} in {locale}"));
/// ```
pub struct I18nConfig {
    pub(crate) default_locale: String,
    pub(crate) resources: Resources,
    pub(crate) detect_locale: bool,
    pub(crate) loader: Option<Arc<dyn LocaleLoader>>,
    pub(crate) on_missing_key: Option<MissingKeyHook>,
    pub(crate) on_change: Option<ChangeHook>,
    pub(crate) load_timeout: Option<Duration>,
    pub(crate) language_source: Arc<dyn LanguageSource>,
}

impl I18nConfig {
    pub fn new(default_locale: impl Into<String>) -> Self {
        Self {
            default_locale: default_locale.into(),
            resources: Resources::new(),
            detect_locale: true,
            loader: None,
            on_missing_key: None,
            on_change: None,
            load_timeout: None,
            language_source: Arc::new(SystemLanguages),
        }
    }

    /// Build a configuration from [`Settings`]. A `catalog_dir` becomes a
    /// [`CatalogDirLoader`].
    pub fn from_settings(settings: &Settings) -> Self {
        let mut config = Self::new(settings.default_locale.clone())
            .detect_locale(settings.detect_locale);
        config.load_timeout = settings.load_timeout_ms.map(Duration::from_millis);
        if let Some(dir) = &settings.catalog_dir {
            config = config.loader(CatalogDirLoader::new(dir));
        }
        config
    }

    /// Replace the static resources.
    pub fn resources(mut self, resources: Resources) -> Self {
        self.resources = resources;
        self
    }

    /// Add one static dictionary.
    pub fn messages(mut self, locale: impl Into<String>, messages: Messages) -> Self {
        self.resources.insert(locale.into(), messages);
        self
    }

    /// Toggle host language detection (on by default).
    pub fn detect_locale(mut self, on: bool) -> Self {
        self.detect_locale = on;
        self
    }

    pub fn loader(mut self, loader: impl LocaleLoader + 'static) -> Self {
        self.loader = Some(Arc::new(loader));
        self
    }

    pub fn on_missing_key(mut self, hook: impl Fn(&str, &str) + Send + Sync + 'static) -> Self {
        self.on_missing_key = Some(Arc::new(hook));
        self
    }

    pub fn on_change(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_change = Some(Arc::new(hook));
        self
    }

    /// Fail loads that take longer than `limit`. No limit by default.
    pub fn load_timeout(mut self, limit: Duration) -> Self {
        self.load_timeout = Some(limit);
        self
    }

    pub fn language_source(mut self, source: impl LanguageSource + 'static) -> Self {
        self.language_source = Arc::new(source);
        self
    }
}

impl std::fmt::Debug for I18nConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("I18nConfig")
            .field("default_locale", &self.default_locale)
            .field("resources", &self.resources.keys().collect::<Vec<_>>())
            .field("detect_locale", &self.detect_locale)
            .field("loader", &self.loader.is_some())
            .field("load_timeout", &self.load_timeout)
            .finish_non_exhaustive()
    }
}

/// File-based settings, usually `i18n.toml`:
///
/// ```toml
/// default_locale = "en"
/// detect_locale = true
/// load_timeout_ms = 5000
/// catalog_dir = "locales"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Required; there is no implicit fallback language.
    pub default_locale: String,
    #[serde(default = "enabled")]
    pub detect_locale: bool,
    #[serde(default)]
    pub load_timeout_ms: Option<u64>,
    #[serde(default)]
    pub catalog_dir: Option<PathBuf>,
}

fn enabled() -> bool {
    true
}

impl Settings {
    pub fn from_toml_str(src: &str) -> Result<Self, I18nError> {
        Ok(toml::from_str(src)?)
    }

    /// Read settings from a TOML file. A relative `catalog_dir` is resolved
    /// against the file's directory.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, I18nError> {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path).map_err(|e| I18nError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut settings = Self::from_toml_str(&src)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        settings.catalog_dir = settings
            .catalog_dir
            .map(|dir| if dir.is_relative() { base.join(dir) } else { dir });
        Ok(settings)
    }
}
