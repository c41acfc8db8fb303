//! Consumer accessors for rendering code.
//!
//! Components receive an [`I18nContext`] explicitly instead of looking the
//! provider up from ambient state. Accessing i18n through a context that was
//! built without a provider is a wiring bug: the `use_*` accessors panic, the
//! `try_use_*` variants return [`I18nError::NotInitialized`].

use crate::error::I18nError;
use crate::format::LocaleFormatter;
use crate::provider::I18nProvider;
use crate::vars::Variables;

/// What a component is handed at render time.
#[derive(Clone, Debug, Default)]
pub struct I18nContext {
    provider: Option<I18nProvider>,
}

impl I18nContext {
    /// A context with no provider.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(provider: I18nProvider) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    pub fn provider(&self) -> Option<&I18nProvider> {
        self.provider.as_ref()
    }
}

impl From<I18nProvider> for I18nContext {
    fn from(provider: I18nProvider) -> Self {
        Self::with_provider(provider)
    }
}

/// The provider's consumer-facing state, captured once per render.
///
/// `locale`, `available_locales`, and `is_loading` are a snapshot taken when
/// the accessor ran; `t` and `set_locale` go to the live provider.
#[derive(Clone, Debug)]
pub struct I18n {
    provider: I18nProvider,
    locale: String,
    available_locales: Vec<String>,
    is_loading: bool,
}

impl I18n {
    fn capture(provider: &I18nProvider) -> Self {
        Self {
            provider: provider.clone(),
            locale: provider.locale(),
            available_locales: provider.available_locales(),
            is_loading: provider.is_loading(),
        }
    }

    pub fn t(&self, key: &str, vars: &Variables) -> String {
        self.provider.t(key, vars)
    }

    pub async fn set_locale(&self, locale: &str) {
        self.provider.set_locale(locale).await;
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn available_locales(&self) -> &[String] {
        &self.available_locales
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn provider(&self) -> &I18nProvider {
        &self.provider
    }
}

pub fn try_use_i18n(ctx: &I18nContext) -> Result<I18n, I18nError> {
    ctx.provider()
        .map(I18n::capture)
        .ok_or(I18nError::NotInitialized {
            accessor: "use_i18n",
        })
}

/// # Panics
///
/// Panics if `ctx` has no provider.
pub fn use_i18n(ctx: &I18nContext) -> I18n {
    try_use_i18n(ctx).unwrap_or_else(|e| panic!("{e}"))
}

pub fn try_use_locale_formatter(ctx: &I18nContext) -> Result<LocaleFormatter, I18nError> {
    ctx.provider()
        .map(I18nProvider::formatter)
        .ok_or(I18nError::NotInitialized {
            accessor: "use_locale_formatter",
        })
}

/// # Panics
///
/// Panics if `ctx` has no provider.
pub fn use_locale_formatter(ctx: &I18nContext) -> LocaleFormatter {
    try_use_locale_formatter(ctx).unwrap_or_else(|e| panic!("{e}"))
}
