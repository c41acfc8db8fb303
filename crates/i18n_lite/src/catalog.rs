use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Locale identifier → dictionary. Iterates in insertion order.
pub type Resources = IndexMap<String, Messages>;

/// One locale's dictionary: translation key → template.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Messages {
    entries: IndexMap<String, String>,
}

impl Messages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, template: impl Into<String>) {
        self.entries.insert(key.into(), template.into());
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.insert(key, template);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|s| s.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Validate a dynamically produced dictionary (e.g. a loader result).
    ///
    /// Only a flat object whose values are all strings is accepted.
    pub fn from_value(value: serde_json::Value) -> Result<Self, CatalogParseError> {
        let serde_json::Value::Object(map) = value else {
            return Err(CatalogParseError::Shape(format!(
                "expected an object, got {}",
                json_kind(&value)
            )));
        };
        let mut out = Self::new();
        for (key, v) in map {
            let serde_json::Value::String(template) = v else {
                return Err(CatalogParseError::Shape(format!(
                    "value for key `{key}` must be a string, got {}",
                    json_kind(&v)
                )));
            };
            out.insert(key, template);
        }
        Ok(out)
    }

    /// Parse a catalog file body: a JSON object, or (with the `yaml`
    /// feature) a YAML mapping. Either way the result goes through
    /// [`Messages::from_value`], so both formats share one shape check.
    pub fn parse(src: &str) -> Result<Self, CatalogParseError> {
        let trimmed = src.trim_start();
        let value = if trimmed.starts_with('{') {
            serde_json::from_str(trimmed).map_err(|e| CatalogParseError::Json(e.to_string()))?
        } else {
            parse_yaml(src)?
        };
        Self::from_value(value)
    }
}

#[cfg(feature = "yaml")]
fn parse_yaml(src: &str) -> Result<serde_json::Value, CatalogParseError> {
    serde_yaml::from_str(src).map_err(|e| CatalogParseError::Yaml(e.to_string()))
}

#[cfg(not(feature = "yaml"))]
fn parse_yaml(_: &str) -> Result<serde_json::Value, CatalogParseError> {
    Err(CatalogParseError::Yaml(
        "not a JSON object, and YAML support is disabled".to_string(),
    ))
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Messages {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut m = Self::new();
        for (k, v) in iter {
            m.insert(k, v);
        }
        m
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogParseError {
    #[error("catalog shape error: {0}")]
    Shape(String),

    #[error("json catalog error: {0}")]
    Json(String),

    #[error("yaml catalog error: {0}")]
    Yaml(String),
}

fn json_kind(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
