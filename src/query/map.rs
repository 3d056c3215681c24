//! Inbound query map.

use serde_json::{Map, Value};

use crate::error::QueryError;

/// Raw request query: string keys to JSON values.
///
/// Values built from a query string are always strings. Nested objects
/// appear when bracket notation was already expanded upstream, e.g.
/// `{"price": {"gte": "10"}}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryMap(Map<String, Value>);

impl QueryMap {
    /// Create an empty query map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw query-string pairs. A repeated key keeps its last
    /// value, which blocks parameter pollution of reserved keys like `sort`.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut map = Map::new();
        for (key, value) in pairs {
            map.insert(key.into(), Value::String(value.into()));
        }
        Self(map)
    }

    /// Build from an already-parsed JSON object.
    pub fn from_value(value: Value) -> Result<Self, QueryError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(QueryError::malformed(
                "<root>",
                format!("expected an object, got {}", json_kind(&other)),
            )),
        }
    }

    /// Raw value for a key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String value for a key, treating blank strings as absent.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    /// Whether the map has an entry for `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the underlying JSON map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

/// Human-readable JSON type name for error messages.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
