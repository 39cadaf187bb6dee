//! Dynamic value model
//!
//! Providers exchange [`Value`]s: JSON-shaped data plus the three kinds the
//! engine threads through a composition without inspecting them (external
//! handles, the live resolution environment, and provider-defined opaque
//! payloads). The JSON-shaped subset converts losslessly to and from
//! `serde_json::Value`.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Number;

use crate::environment::Environment;
use crate::handle::Handle;

/// String-keyed map of values, the shape of building-block inputs
pub type ValueMap = BTreeMap<String, Value>;

/// A value resolved by a provider or supplied as building-block input
#[derive(Clone, Default)]
pub enum Value {
    /// Absent value
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// Integer or floating point number
    Number(Number),
    /// UTF-8 string
    Str(String),
    /// Ordered list of values
    List(Vec<Value>),
    /// String-keyed map of values
    Map(ValueMap),
    /// External resource handle threaded through a composition
    Handle(Handle),
    /// The ambient resolution environment
    Environment(Arc<dyn Environment>),
    /// Provider-defined payload the engine never inspects
    Opaque(Arc<dyn Any + Send + Sync>),
}

impl Value {
    /// True if this value is `Null`
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrow as a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Borrow as an integer
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// Borrow as a float
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Borrow as a string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow as a list
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow as a map
    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Borrow as a handle
    pub fn as_handle(&self) -> Option<&Handle> {
        match self {
            Self::Handle(handle) => Some(handle),
            _ => None,
        }
    }

    /// Borrow as the ambient environment
    pub fn as_environment(&self) -> Option<&Arc<dyn Environment>> {
        match self {
            Self::Environment(env) => Some(env),
            _ => None,
        }
    }

    /// Downcast an opaque payload to a concrete type
    pub fn opaque<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        match self {
            Self::Opaque(payload) => Arc::clone(payload).downcast::<T>().ok(),
            _ => None,
        }
    }

    /// Wrap a provider-defined payload
    pub fn opaque_from<T: Any + Send + Sync>(payload: T) -> Self {
        Self::Opaque(Arc::new(payload))
    }

    /// Convert the JSON-representable subset to `serde_json::Value`
    ///
    /// Returns `None` when the value (or any nested value) is a handle,
    /// an environment, or an opaque payload.
    pub fn to_json(&self) -> Option<serde_json::Value> {
        match self {
            Self::Null => Some(serde_json::Value::Null),
            Self::Bool(b) => Some(serde_json::Value::Bool(*b)),
            Self::Number(n) => Some(serde_json::Value::Number(n.clone())),
            Self::Str(s) => Some(serde_json::Value::String(s.clone())),
            Self::List(items) => items
                .iter()
                .map(Value::to_json)
                .collect::<Option<Vec<_>>>()
                .map(serde_json::Value::Array),
            Self::Map(map) => map
                .iter()
                .map(|(key, value)| value.to_json().map(|json| (key.clone(), json)))
                .collect::<Option<serde_json::Map<_, _>>>()
                .map(serde_json::Value::Object),
            Self::Handle(_) | Self::Environment(_) | Self::Opaque(_) => None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Bool(b) => write!(f, "Bool({b})"),
            Self::Number(n) => write!(f, "Number({n})"),
            Self::Str(s) => write!(f, "Str({s:?})"),
            Self::List(items) => f.debug_tuple("List").field(items).finish(),
            Self::Map(map) => f.debug_tuple("Map").field(map).finish(),
            Self::Handle(handle) => f.debug_tuple("Handle").field(handle).finish(),
            Self::Environment(_) => f.write_str("Environment(..)"),
            Self::Opaque(_) => f.write_str("Opaque(..)"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            // Reference kinds compare by identity, not by content
            (Self::Handle(a), Self::Handle(b)) => a.same(b),
            (Self::Environment(a), Self::Environment(b)) => Arc::ptr_eq(a, b),
            (Self::Opaque(a), Self::Opaque(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl serde::Serialize for Value {
    /// Serialize the JSON-representable subset
    ///
    /// Handles, environments, and opaque payloads have no serial form and
    /// fail with a descriptive error.
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.to_json() {
            Some(json) => json.serialize(serializer),
            None => Err(serde::ser::Error::custom(
                "handles, environments and opaque payloads are not serializable",
            )),
        }
    }
}

impl<'de> serde::Deserialize<'de> for Value {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n),
            serde_json::Value::String(s) => Self::Str(s),
            serde_json::Value::Array(items) => Self::List(items.into_iter().map(Into::into).collect()),
            serde_json::Value::Object(map) => {
                Self::Map(map.into_iter().map(|(key, value)| (key, value.into())).collect())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(Number::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<ValueMap> for Value {
    fn from(map: ValueMap) -> Self {
        Self::Map(map)
    }
}
