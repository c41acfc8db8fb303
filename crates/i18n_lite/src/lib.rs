//! Lightweight internationalization for UI components.
//!
//! - [`I18nProvider`]: owns the locale → dictionary store, the active locale,
//!   and lazy async loading of missing dictionaries
//! - [`use_i18n`] / [`use_locale_formatter`]: accessors for rendering code,
//!   fed an explicitly passed [`I18nContext`]
//! - [`interpolate`]: `{{name}}` placeholder substitution
//! - [`detect_locale`]: negotiation against the host's language preferences
//! - [`LocaleFormatter`]: locale-aware date, number, and currency formatting
//!
//! ```ignore
//! let provider = I18nProvider::start(
//!     I18nConfig::new("en")
//!         .messages("en", Messages::new().with("welcome", "Welcome, {{name}}!"))
//!         .loader(CatalogDirLoader::new("locales")),
//! )
//! .await;
//!
//! let ctx = I18nContext::from(provider);
//! let i18n = use_i18n(&ctx);
//! assert_eq!(t!(i18n, "welcome", { name: "Ana" }), "Welcome, Ana!");
//! i18n.set_locale("fr").await;
//! ```

mod catalog;
mod config;
mod error;
mod format;
mod hooks;
mod interpolate;
mod loader;
mod locale;
mod provider;
mod vars;

pub use catalog::{CatalogParseError, Messages, Resources};
pub use config::{ChangeHook, I18nConfig, MissingKeyHook, Settings};
pub use error::{FormatError, I18nError, LoadError};
pub use format::{
    create_locale_formatter, DateFormatOptions, DateInput, DateStyle, LocaleFormatter,
    NumberFormatOptions, NumberStyle,
};
pub use hooks::{
    try_use_i18n, try_use_locale_formatter, use_i18n, use_locale_formatter, I18n, I18nContext,
};
pub use interpolate::interpolate;
pub use loader::{loader_fn, CatalogDirLoader, FnLoader, LoadFuture, LocaleLoader};
pub use locale::{
    detect_locale, detect_locale_from, normalize_locale, primary_subtag, LanguagePreferences,
    LanguageSource, StaticLanguages, SystemLanguages,
};
pub use provider::I18nProvider;
pub use vars::{ArgValue, Variables};

/// Translate through anything with a `t(key, &Variables)` method
/// ([`I18n`], [`I18nProvider`]).
///
/// - `t!(i18n, "app.title")`
/// - `t!(i18n, "greeting", { name: user_name, count: 3 })`
#[macro_export]
macro_rules! t {
    ($i18n:expr, $key:expr) => {
        $i18n.t($key, &$crate::Variables::new())
    };
    ($i18n:expr, $key:expr, { $($name:ident : $value:expr),* $(,)? }) => {{
        #[allow(unused_mut)]
        let mut v = $crate::Variables::new();
        $(
            v.insert(stringify!($name), $value);
        )*
        $i18n.t($key, &v)
    }};
}
