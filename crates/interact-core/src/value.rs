//! Dynamic, structurally shared values for state trees
//!
//! Containers are reference counted: cloning a `Value` shares the subtree, and
//! [`Value::same`] tells whether two values are the very same subtree. Reducers
//! never mutate a tree in place; they build new containers and reuse the
//! children that did not change.

use crate::{Error, Model, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A dynamic value that can represent any slice of application state
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub enum Value {
    /// No value / null
    #[default]
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// String value
    String(String),
    /// Shared list of values
    List(Arc<Vec<Value>>),
    /// Shared map of string keys to values
    Map(Arc<ValueMap>),
    /// Immutable, kind-tagged record
    Model(Arc<Model>),
}

/// A map of string keys to dynamic values
///
/// Uses IndexMap to preserve insertion order (useful for deterministic serialization)
pub type ValueMap = IndexMap<String, Value>;

impl Value {
    /// A fresh empty map with its own identity
    pub fn empty_map() -> Self {
        Value::Map(Arc::new(ValueMap::new()))
    }

    /// Wrap a map
    pub fn map(map: ValueMap) -> Self {
        Value::Map(Arc::new(map))
    }

    /// Wrap a list
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Arc::new(items))
    }

    /// Build a map from key/value pairs
    pub fn record<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Value::map(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Try to get this value as a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get this value as an integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get this value as a float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get this value as a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get this value as a list
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    /// Try to get this value as a plain map
    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Try to get this value as a model
    pub fn as_model(&self) -> Option<&Model> {
        match self {
            Value::Model(model) => Some(model),
            _ => None,
        }
    }

    /// Field map of a plain map or a model
    pub fn fields(&self) -> Option<&ValueMap> {
        match self {
            Value::Map(map) => Some(map),
            Value::Model(model) => Some(model.fields()),
            _ => None,
        }
    }

    /// Read a single field of a map or model
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields().and_then(|fields| fields.get(key))
    }

    /// Render a string or integer as a map key
    pub fn as_key(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Int(i) => Some(i.to_string()),
            _ => None,
        }
    }

    /// Get the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Model(_) => "model",
        }
    }

    /// Check if this value is truthy
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::List(_) | Value::Map(_) | Value::Model(_) => true,
        }
    }

    /// Reference identity
    ///
    /// Containers and models are the same only when they share an allocation.
    /// Scalars carry no identity of their own and compare by value.
    pub fn same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::List(a), Value::List(b)) => Arc::ptr_eq(a, b),
            (Value::Map(a), Value::Map(b)) => Arc::ptr_eq(a, b),
            (Value::Model(a), Value::Model(b)) => Arc::ptr_eq(a, b),
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::String(a), Value::String(b)) => a == b,
            _ => false,
        }
    }

    /// Structural equality
    ///
    /// A model and a plain map with the same fields are equal; the kind marker
    /// is not part of the data.
    pub fn deep_eq(&self, other: &Value) -> bool {
        if self.same(other) {
            return true;
        }
        match (self, other) {
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.deep_eq(y))
            }
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                *a as f64 == *b
            }
            _ => match (self.fields(), other.fields()) {
                (Some(a), Some(b)) => {
                    a.len() == b.len()
                        && a.iter()
                            .all(|(k, v)| b.get(k).is_some_and(|other| v.deep_eq(other)))
                }
                _ => false,
            },
        }
    }

    /// Look up the value at `path`
    pub fn get_in<S: AsRef<str>>(&self, path: &[S]) -> Option<&Value> {
        let mut current = self;
        for key in path {
            current = current.get(key.as_ref())?;
        }
        Some(current)
    }

    /// Check whether `path` exists
    pub fn has_path<S: AsRef<str>>(&self, path: &[S]) -> bool {
        self.get_in(path).is_some()
    }

    /// Return a new tree with `value` stored at `path`
    ///
    /// Only the chain of maps from the root down to `path` is rebuilt; every
    /// sibling subtree keeps its allocation. Missing or non-map intermediates
    /// are replaced by fresh maps. A model along the path is unwrapped into a
    /// plain map, since models are never edited in place.
    pub fn set_in<S: AsRef<str>>(&self, path: &[S], value: Value) -> Value {
        let Some((head, rest)) = path.split_first() else {
            return value;
        };
        let mut map = self.fields().cloned().unwrap_or_default();
        let child = match map.get(head.as_ref()) {
            Some(existing) => existing.set_in(rest, value),
            None => Value::Null.set_in(rest, value),
        };
        map.insert(head.as_ref().to_string(), child);
        Value::map(map)
    }

    /// Interpret this value as positional arguments
    pub fn expect_list(&self) -> Result<&[Value]> {
        self.as_list().ok_or_else(|| Error::type_error("list", self))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.deep_eq(other)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::List(list) => {
                write!(f, "[")?;
                for (i, v) in list.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            Value::Map(map) => write_fields(f, map),
            Value::Model(model) => {
                write!(f, "{}", model.kind())?;
                write_fields(f, model.fields())
            }
        }
    }
}

fn write_fields(f: &mut fmt::Formatter<'_>, map: &ValueMap) -> fmt::Result {
    write!(f, "{{")?;
    for (i, (k, v)) in map.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}: {}", k, v)?;
    }
    write!(f, "}}")
}

// Convenient From implementations
impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<ValueMap> for Value {
    fn from(map: ValueMap) -> Self {
        Value::map(map)
    }
}

impl From<Model> for Value {
    fn from(model: Model) -> Self {
        Value::Model(Arc::new(model))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(vec: Vec<T>) -> Self {
        Value::list(vec.into_iter().map(Into::into).collect())
    }
}
