//! Async dictionary loaders.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use tracing::debug;

use crate::error::LoadError;

/// Boxed future returned by [`LocaleLoader::load`].
pub type LoadFuture = Pin<Box<dyn Future<Output = Result<serde_json::Value, LoadError>> + Send>>;

/// Fetches one locale's dictionary on demand.
///
/// The result is untyped on purpose: the provider validates that it is an
/// object mapping keys to strings and rejects anything else.
pub trait LocaleLoader: Send + Sync {
    fn load(&self, locale: &str) -> LoadFuture;
}

/// Adapter turning an async closure into a [`LocaleLoader`].
pub struct FnLoader<F>(F);

/// Wrap `f(locale)` as a loader.
///
/// ```ignore
/// let loader = loader_fn(|locale| async move {
///     fetch_json(&format!("/locales/{locale}.json")).await.map_err(LoadError::loader)
/// });
/// ```
pub fn loader_fn<F, Fut>(f: F) -> FnLoader<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<serde_json::Value, LoadError>> + Send + 'static,
{
    FnLoader(f)
}

impl<F, Fut> LocaleLoader for FnLoader<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<serde_json::Value, LoadError>> + Send + 'static,
{
    fn load(&self, locale: &str) -> LoadFuture {
        Box::pin((self.0)(locale.to_string()))
    }
}

/// Loads `<dir>/<locale>.<ext>` catalog files.
///
/// Extensions are tried in order: `json`, `yaml`, `yml`. The first
/// existing file wins and is parsed with [`Messages::parse`](crate::Messages::parse).
#[derive(Clone, Debug)]
pub struct CatalogDirLoader {
    dir: PathBuf,
}

const CATALOG_EXTENSIONS: &[&str] = &["json", "yaml", "yml"];

impl CatalogDirLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }
}

impl LocaleLoader for CatalogDirLoader {
    fn load(&self, locale: &str) -> LoadFuture {
        let dir = self.dir.clone();
        let locale = locale.to_string();
        Box::pin(async move {
            // Locale ids become file names; refuse anything path-like.
            if locale.is_empty()
                || !locale
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            {
                return Err(LoadError::NotFound(locale));
            }

            for ext in CATALOG_EXTENSIONS {
                let path = dir.join(format!("{locale}.{ext}"));
                match tokio::fs::read_to_string(&path).await {
                    Ok(src) => {
                        debug!(path = %path.display(), "loading catalog");
                        let messages = crate::catalog::Messages::parse(&src)?;
                        return serde_json::to_value(messages)
                            .map_err(|e| LoadError::Malformed(e.to_string()));
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                    Err(e) => return Err(e.into()),
                }
            }
            Err(LoadError::NotFound(locale))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn closure_loader_receives_locale() {
        let loader = loader_fn(|locale| async move { Ok(json!({ "locale": locale })) });
        let v = loader.load("fr").await.unwrap();
        assert_eq!(v, json!({ "locale": "fr" }));
    }

    #[tokio::test]
    async fn dir_loader_reads_first_matching_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("de.yml"), "greet: Hallo {{name}}\n").unwrap();
        std::fs::write(dir.path().join("fr.json"), r#"{ "greet": "Salut {{name}}" }"#).unwrap();
        std::fs::write(dir.path().join("fr.yaml"), "greet: ignored\n").unwrap();
        std::fs::write(dir.path().join("es.txt"), "greet = Hola {{name}}\n").unwrap();

        let loader = CatalogDirLoader::new(dir.path());
        assert_eq!(
            loader.load("de").await.unwrap(),
            json!({ "greet": "Hallo {{name}}" })
        );
        assert_eq!(
            loader.load("fr").await.unwrap(),
            json!({ "greet": "Salut {{name}}" })
        );
        assert!(matches!(
            loader.load("es").await,
            Err(LoadError::NotFound(l)) if l == "es"
        ));
    }

    #[tokio::test]
    async fn dir_loader_rejects_path_like_locales() {
        let dir = tempfile::tempdir().unwrap();
        let loader = CatalogDirLoader::new(dir.path());
        assert!(matches!(
            loader.load("../secrets").await,
            Err(LoadError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn dir_loader_surfaces_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("xx.json"), r#"{ "greet": 1 }"#).unwrap();
        let loader = CatalogDirLoader::new(dir.path());
        assert!(matches!(
            loader.load("xx").await,
            Err(LoadError::Catalog(_))
        ));
    }
}
