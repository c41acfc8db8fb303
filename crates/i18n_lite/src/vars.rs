use std::borrow::Cow;
use std::fmt;

use indexmap::IndexMap;

/// A value substituted into a `{{placeholder}}`.
#[derive(Clone, Debug, PartialEq)]
pub enum ArgValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Renders as an empty string.
    Null,
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Str(s) => f.write_str(s),
            ArgValue::Int(i) => write!(f, "{i}"),
            // Shortest round-trip form: `100.0` renders as `100`.
            ArgValue::Float(v) => write!(f, "{v}"),
            ArgValue::Bool(b) => write!(f, "{b}"),
            ArgValue::Null => Ok(()),
        }
    }
}

impl From<String> for ArgValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<&str> for ArgValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<&String> for ArgValue {
    fn from(v: &String) -> Self {
        Self::Str(v.clone())
    }
}

impl From<i64> for ArgValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for ArgValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u32> for ArgValue {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u64> for ArgValue {
    fn from(v: u64) -> Self {
        i64::try_from(v).map_or_else(|_| Self::Str(v.to_string()), Self::Int)
    }
}

/// Counts past `i64::MAX` keep their exact digits as text.
impl From<usize> for ArgValue {
    fn from(v: usize) -> Self {
        i64::try_from(v).map_or_else(|_| Self::Str(v.to_string()), Self::Int)
    }
}

impl From<f64> for ArgValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<f32> for ArgValue {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<bool> for ArgValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl<T: Into<ArgValue>> From<Option<T>> for ArgValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// Named interpolation variables.
///
/// A name that is present with [`ArgValue::Null`] renders as an empty string;
/// a name that is absent leaves its placeholder untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Variables {
    values: IndexMap<Cow<'static, str>, ArgValue>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn arg(mut self, name: impl Into<Cow<'static, str>>, value: impl Into<ArgValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<Cow<'static, str>>, value: impl Into<ArgValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}

impl<K, V> FromIterator<(K, V)> for Variables
where
    K: Into<Cow<'static, str>>,
    V: Into<ArgValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut vars = Self::new();
        for (k, v) in iter {
            vars.insert(k, v);
        }
        vars
    }
}

/// Build [`Variables`] from `name: value` pairs.
///
/// - `vars!{}`
/// - `vars!{ name: user_name, count: 3 }`
#[macro_export]
macro_rules! vars {
    () => {
        $crate::Variables::new()
    };
    ($($name:ident : $value:expr),+ $(,)?) => {{
        let mut v = $crate::Variables::new();
        $(
            v.insert(stringify!($name), $value);
        )+
        v
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn display_matches_plain_string_conversion() {
        assert_eq!(ArgValue::from("Ana").to_string(), "Ana");
        assert_eq!(ArgValue::from(42).to_string(), "42");
        assert_eq!(ArgValue::from(1.5).to_string(), "1.5");
        assert_eq!(ArgValue::from(2.0).to_string(), "2");
        assert_eq!(ArgValue::from(true).to_string(), "true");
        assert_eq!(ArgValue::from(None::<&str>).to_string(), "");
        assert_eq!(ArgValue::from(100.0).to_string(), "100");
        assert_eq!(ArgValue::from(-0.25_f32).to_string(), "-0.25");
    }

    #[test]
    fn unsigned_values_never_wrap() {
        assert_eq!(ArgValue::from(7_usize), ArgValue::Int(7));
        assert_eq!(ArgValue::from(u32::MAX), ArgValue::Int(4_294_967_295));
        assert_eq!(
            ArgValue::from(u64::MAX),
            ArgValue::Str("18446744073709551615".into())
        );
        let big = ArgValue::from(usize::MAX);
        assert_eq!(big.to_string(), usize::MAX.to_string());
    }

    #[test]
    fn macro_builds_named_values() {
        let count = 3;
        let v = vars! { name: "Zara", count: count };
        assert_eq!(v.len(), 2);
        assert_eq!(v.get("name"), Some(&ArgValue::Str("Zara".into())));
        assert_eq!(v.get("count"), Some(&ArgValue::Int(3)));
        assert!(vars! {}.is_empty());
    }
}
