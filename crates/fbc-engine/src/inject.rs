//! Property-map injection
//!
//! A [`PropsMap`] declares which providers feed which input properties:
//! leaves are provider names, intermediate nodes are nested mappings or
//! ordered lists. [`inject`] resolves the declared shape through the ambient
//! environment and merges the populated result onto a shallow copy of the
//! invocation's inputs. Declarations also arrive as JSON, so composition
//! tables can live in data.

use std::collections::BTreeMap;
use std::sync::Arc;

use fbc_domain::{Environment, Error, Result, Value, ValueMap};

use crate::registry::ProviderFn;

/// Declarative mapping from target property names to provider names
#[derive(Debug, Clone, PartialEq)]
pub enum PropsMap {
    /// Leaf: the name of the provider whose resolved value fills the slot
    Name(String),
    /// Nested mapping, resolved to a map of the same shape
    Map(BTreeMap<String, PropsMap>),
    /// Ordered list, resolved to a list of the same shape
    List(Vec<PropsMap>),
}

impl PropsMap {
    /// Leaf declaration naming a provider
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// Parse a JSON declaration: strings are names, objects are nested
    /// mappings, arrays are lists
    pub fn from_json(decl: &serde_json::Value) -> Result<Self> {
        match decl {
            serde_json::Value::String(name) => Ok(Self::Name(name.clone())),
            serde_json::Value::Object(entries) => entries
                .iter()
                .map(|(key, value)| Self::from_json(value).map(|parsed| (key.clone(), parsed)))
                .collect::<Result<BTreeMap<_, _>>>()
                .map(Self::Map),
            serde_json::Value::Array(items) => items
                .iter()
                .map(Self::from_json)
                .collect::<Result<Vec<_>>>()
                .map(Self::List),
            other => Err(Error::invalid_argument(format!(
                "property-map declarations are strings, objects or arrays, got: {other}"
            ))),
        }
    }

    /// Resolve the declared shape, replacing each name with its value
    fn resolve(&self, environment: &dyn Environment) -> Result<Value> {
        match self {
            Self::Name(name) => environment.resolve(name),
            Self::Map(entries) => entries
                .iter()
                .map(|(key, nested)| nested.resolve(environment).map(|value| (key.clone(), value)))
                .collect::<Result<ValueMap>>()
                .map(Value::Map),
            Self::List(items) => items
                .iter()
                .map(|nested| nested.resolve(environment))
                .collect::<Result<Vec<_>>>()
                .map(Value::List),
        }
    }
}

/// Merge the resolved property map onto a shallow copy of `inputs`
///
/// Merged keys overwrite input keys of the same name. The resolved map must
/// be map-shaped, and `inputs` must be a map (or `Null`, treated as empty).
pub fn inject(map: &PropsMap, inputs: &Value, environment: &dyn Environment) -> Result<Value> {
    let Value::Map(resolved) = map.resolve(environment)? else {
        return Err(Error::invalid_argument(
            "top-level property map must resolve to a mapping",
        ));
    };

    let mut merged = match inputs {
        Value::Map(map) => map.clone(),
        Value::Null => ValueMap::new(),
        other => {
            return Err(Error::invalid_argument(format!(
                "cannot inject properties into non-map inputs: {other:?}"
            )));
        }
    };
    merged.extend(resolved);
    Ok(Value::Map(merged))
}

/// Build a reusable `(inputs, environment) -> mergedInputs` transform
pub fn inject_by_map(
    map: PropsMap,
) -> impl Fn(&Value, &dyn Environment) -> Result<Value> + Send + Sync {
    move |inputs, environment| inject(&map, inputs, environment)
}

/// Package an injection as an ordinary provider source
///
/// Declare it with dependencies `["currentInputs", "currentEnvironment"]`;
/// it resolves the map through the same memoization table as its siblings.
pub fn injector_provider(map: PropsMap) -> ProviderFn {
    Arc::new(move |deps: &[Value]| {
        let (Some(inputs), Some(environment)) = (deps.first(), deps.get(1)) else {
            return Err(Error::invalid_argument(
                "injector provider expects currentInputs and currentEnvironment dependencies",
            ));
        };
        let environment = environment.as_environment().ok_or_else(|| {
            Error::invalid_argument("injector provider expects currentEnvironment as second dependency")
        })?;
        inject(&map, inputs, environment.as_ref())
    })
}
