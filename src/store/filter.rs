//! Structured predicates and patches for document store calls.
//!
//! Filters are values, not query strings, so every backend can translate
//! them into its own query language and the in-memory store can evaluate
//! them directly against JSON documents.

use serde::Serialize;
use serde_json::{Map, Value};

/// A predicate over documents in a collection
///
/// `Filter::All` (also the `Default`) matches every document.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Filter {
    #[default]
    All,
    /// Field equals the value
    Eq(String, Value),
    /// Field equals any of the values
    In(String, Vec<Value>),
    /// Every inner filter matches
    And(Vec<Filter>),
}

impl Filter {
    pub fn all() -> Self {
        Self::All
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq(field.into(), value.into())
    }

    pub fn any_of<V: Into<Value>>(field: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Self::In(field.into(), values.into_iter().map(Into::into).collect())
    }

    /// Combine with another filter; `All` is the identity
    pub fn and(self, other: Filter) -> Self {
        match (self, other) {
            (Self::All, f) | (f, Self::All) => f,
            (Self::And(mut left), Self::And(right)) => {
                left.extend(right);
                Self::And(left)
            }
            (Self::And(mut left), f) => {
                left.push(f);
                Self::And(left)
            }
            (f, Self::And(mut right)) => {
                right.insert(0, f);
                Self::And(right)
            }
            (a, b) => Self::And(vec![a, b]),
        }
    }

    /// Evaluate the filter against a JSON document
    pub fn matches(&self, doc: &Value) -> bool {
        match self {
            Self::All => true,
            Self::Eq(field, expected) => doc.get(field).is_some_and(|v| values_equal(v, expected)),
            Self::In(field, candidates) => doc
                .get(field)
                .is_some_and(|v| candidates.iter().any(|c| values_equal(v, c))),
            Self::And(filters) => filters.iter().all(|f| f.matches(doc)),
        }
    }
}

// Integers stored as 15 must match a filter value of 15u8 or 15i64 alike.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        _ => a == b,
    }
}

/// A set of field assignments applied by `update_one` / `update_many`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Patch {
    fields: Map<String, Value>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field to a serializable value
    ///
    /// A value that fails to serialize leaves the field out of the patch, so
    /// the stored field keeps its current value.
    pub fn set<T: Serialize>(mut self, field: impl Into<String>, value: T) -> Self {
        let field = field.into();
        match serde_json::to_value(value) {
            Ok(value) => {
                self.fields.insert(field, value);
            }
            Err(e) => {
                tracing::warn!(field = %field, error = %e, "patch value failed to serialize, field skipped");
            }
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Apply the patch to a document in place
    pub fn apply(&self, doc: &mut Value) {
        if let Value::Object(map) = doc {
            for (k, v) in &self.fields {
                map.insert(k.clone(), v.clone());
            }
        }
    }
}
