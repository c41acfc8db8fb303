use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::catalog::CatalogParseError;

/// Top-level error for the crate.
#[derive(Debug, Error)]
pub enum I18nError {
    /// A consumer accessor was used without a provider in its context.
    #[error("{accessor} must be used within an initialized I18nProvider (no provider in context)")]
    NotInitialized { accessor: &'static str },

    #[error("failed to load locale `{locale}`: {source}")]
    LocaleLoad {
        locale: String,
        #[source]
        source: LoadError,
    },

    #[error(transparent)]
    Catalog(#[from] CatalogParseError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("invalid settings: {0}")]
    Settings(#[from] toml::de::Error),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a locale dictionary could not be loaded.
///
/// Load failures never reach consumers of the provider; they are logged and
/// the previous locale is kept.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("loader failed: {0}")]
    Loader(String),

    #[error("loaded locale must be an object mapping keys to strings: {0}")]
    Malformed(String),

    #[error("loader timed out after {0:?}")]
    TimedOut(Duration),

    #[error("no catalog found for locale `{0}`")]
    NotFound(String),

    #[error("the load this request was waiting on was dropped before completing")]
    Abandoned,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Catalog(#[from] CatalogParseError),
}

impl LoadError {
    /// Wrap any displayable loader failure.
    pub fn loader(err: impl std::fmt::Display) -> Self {
        Self::Loader(err.to_string())
    }
}

/// Errors raised synchronously by [`LocaleFormatter`](crate::LocaleFormatter).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("invalid date value: {0}")]
    InvalidDate(String),

    #[error("currency style requires a currency code")]
    MissingCurrency,

    #[error("invalid currency code `{0}`")]
    InvalidCurrency(String),

    #[error("invalid time zone `{0}`")]
    InvalidTimeZone(String),

    #[error("fraction digits out of range (min {min}, max {max})")]
    FractionDigits { min: u8, max: u8 },

    #[error("number `{0}` cannot be represented as a decimal")]
    InvalidNumber(String),

    #[error("no formatting data for locale `{0}`")]
    UnsupportedLocale(String),
}
