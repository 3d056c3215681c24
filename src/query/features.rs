//! Request query to filter/sort/projection/pagination translation.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::QueryError;

use super::map::{json_kind, QueryMap};
use super::operator::{key_operator, rewrite_key};
use super::pagination::{PageRequest, Pagination};
use super::sort::{split_list, Projection, SortSpec};

/// Query keys reserved for sorting, projection and paging.
pub const DEFAULT_EXCLUDED_FIELDS: [&str; 5] = ["page", "sort", "limit", "fields", "select"];

/// Default sort key.
pub const DEFAULT_SORT: &str = "_id";

/// Engine-ready filter predicates.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FilterSpec(Map<String, Value>);

impl FilterSpec {
    /// Predicate for a key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// An empty filter matches everything.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of predicates.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Consume into the underlying JSON map.
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

/// Translates one request's query into query-layer primitives.
///
/// Instances are request-scoped and never mutate the stored query, so each
/// derivation can be repeated with the same result.
#[derive(Debug, Clone)]
pub struct ApiFeatures {
    query: QueryMap,
    excluded_fields: Vec<String>,
}

impl ApiFeatures {
    /// Create a translator with the default excluded fields.
    pub fn new(query: QueryMap) -> Self {
        Self {
            query,
            excluded_fields: DEFAULT_EXCLUDED_FIELDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// Create a translator with a custom excluded-field set. An empty set
    /// falls back to the defaults.
    pub fn with_excluded_fields<I, S>(query: QueryMap, excluded: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let excluded_fields: Vec<String> = excluded.into_iter().map(Into::into).collect();
        if excluded_fields.is_empty() {
            return Self::new(query);
        }
        Self {
            query,
            excluded_fields,
        }
    }

    /// The stored query.
    pub fn query(&self) -> &QueryMap {
        &self.query
    }

    /// Keys never treated as filter predicates.
    pub fn excluded_fields(&self) -> &[String] {
        &self.excluded_fields
    }

    /// Derive the filter specification.
    ///
    /// Excluded keys are dropped, operator keywords used as object keys are
    /// rewritten to `$` tokens (values are never touched), and `in`/`nin`
    /// operands are split on commas.
    pub fn filter(&self) -> Result<FilterSpec, QueryError> {
        let mut filter = Map::new();

        for (key, value) in self.query.as_map() {
            if self.excluded_fields.iter().any(|f| f == key) {
                continue;
            }

            let key = rewrite_key(key);
            let mut value = rewrite_keys(&key, value.clone())?;

            if key_operator(&key).is_some_and(|op| op.takes_list()) {
                value = explode_list(&key, value)?;
            } else if let Value::Object(ops) = &mut value {
                for (op_key, operand) in ops.iter_mut() {
                    if key_operator(op_key).is_some_and(|op| op.takes_list()) {
                        let field = format!("{key}.{op_key}");
                        *operand = explode_list(&field, operand.take())?;
                    }
                }
            }

            if filter.contains_key(&key) {
                return Err(duplicate_predicate(&key));
            }
            filter.insert(key, value);
        }

        debug!(predicates = filter.len(), "derived filter specification");
        Ok(FilterSpec(filter))
    }

    /// Derive the sort specification, defaulting to `_id` ascending.
    pub fn sort(&self) -> SortSpec {
        self.sort_or(DEFAULT_SORT)
    }

    /// Derive the sort specification with a caller-supplied default list.
    pub fn sort_or(&self, default: &str) -> SortSpec {
        SortSpec::parse(self.query.get_str("sort").unwrap_or(default))
    }

    /// Derive the projection, excluding only `__v` when nothing is requested.
    pub fn projection(&self) -> Projection {
        self.projection_or("")
    }

    /// Derive the projection. Precedence: `fields`, then `select`, then the
    /// non-blank `default` list, then `-__v`.
    pub fn projection_or(&self, default: &str) -> Projection {
        let requested = self
            .query
            .get_str("fields")
            .or_else(|| self.query.get_str("select"))
            .or(Some(default).filter(|d| !d.trim().is_empty()));

        match requested {
            Some(list) => Projection::parse(list),
            None => Projection::exclude_version(),
        }
    }

    /// Read `page`/`limit` from the query.
    pub fn page_request(&self, default_limit: u64) -> Result<PageRequest, QueryError> {
        PageRequest::from_query(&self.query, default_limit)
    }

    /// Describe adjacent pages. Independent of any instance.
    pub fn paginate(page: u64, limit: u64, total: u64) -> Pagination {
        Pagination::compute(page, limit, total)
    }
}

/// Recursively rewrite operator keywords found in object keys.
///
/// Two keys that rewrite to the same token (`gte` and `$gte`) are rejected.
fn rewrite_keys(path: &str, value: Value) -> Result<Value, QueryError> {
    match value {
        Value::Object(map) => {
            let mut rewritten = Map::new();
            for (k, v) in map {
                let k = rewrite_key(&k);
                let v = rewrite_keys(&format!("{path}.{k}"), v)?;
                if rewritten.contains_key(&k) {
                    return Err(duplicate_predicate(&format!("{path}.{k}")));
                }
                rewritten.insert(k, v);
            }
            Ok(Value::Object(rewritten))
        }
        Value::Array(items) => items
            .into_iter()
            .map(|item| rewrite_keys(path, item))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        other => Ok(other),
    }
}

fn duplicate_predicate(field: &str) -> QueryError {
    QueryError::malformed(field, "operator given more than once")
}

/// Split a list operand into trimmed strings. Empty segments are skipped.
fn explode_list(field: &str, value: Value) -> Result<Value, QueryError> {
    match value {
        Value::String(s) => Ok(split_list(&s)
            .map(|part| Value::String(part.to_string()))
            .collect()),
        Value::Array(items) => {
            let mut parts = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::String(s) => {
                        parts.extend(split_list(&s).map(|part| Value::String(part.to_string())))
                    }
                    other => {
                        return Err(QueryError::malformed(
                            field,
                            format!("list items must be strings, got {}", json_kind(&other)),
                        ))
                    }
                }
            }
            Ok(Value::Array(parts))
        }
        other => Err(QueryError::malformed(
            field,
            format!(
                "expected a comma-separated string, got {}",
                json_kind(&other)
            ),
        )),
    }
}
