//! Resolution context
//!
//! One [`ResolveContext`] exists per top-level invocation (or per sharing
//! boundary). It carries the invocation's inputs and handle, the memoization
//! table enforcing at-most-once evaluation per provider name, and any
//! constants promoted by an enclosing sharing boundary. Contexts are passed
//! explicitly through every composed boundary; clones share the same inner
//! state.
//!
//! The memoization lock is never held across a provider call, so re-entrant
//! resolution within the one invocation thread cannot deadlock.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use fbc_domain::{Environment, Error, Handle, Result, Value};

use crate::builtins::{
    CURRENT_ENVIRONMENT, CURRENT_HANDLE, CURRENT_INPUTS, CURRENT_INPUTS_WITH_HANDLE,
    HANDLE_INPUT_KEY,
};
use crate::registry::ProviderRegistry;

/// How a context came to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextOrigin {
    /// Freshly created at the top of an invocation
    Root,
    /// Created under an ancestor sharing boundary, carrying its constants
    Inherited,
}

/// Memoization slot for one provider name
enum MemoEntry {
    /// Resolution entered but not yet produced; hitting this is a cycle
    InProgress,
    /// The provider's resolved value for this context
    Resolved(Value),
}

struct ContextInner {
    registry: Arc<ProviderRegistry>,
    inputs: Value,
    handle: Option<Handle>,
    /// Constants promoted by a sharing boundary; looked up before the
    /// registry, so their sources can never re-run
    shared: Mutex<HashMap<String, Value>>,
    memo: Mutex<HashMap<String, MemoEntry>>,
    origin: ContextOrigin,
}

/// Per-invocation resolution and memoization environment
#[derive(Clone)]
pub struct ResolveContext {
    inner: Arc<ContextInner>,
}

impl ResolveContext {
    /// Fresh context at the top of an invocation
    pub fn root(registry: Arc<ProviderRegistry>, inputs: Value, handle: Option<Handle>) -> Self {
        debug!(origin = "root", "created resolution context");
        Self::with_shared(registry, inputs, handle, HashMap::new(), ContextOrigin::Root)
    }

    /// Fresh context under an ancestor boundary, inheriting its constants
    ///
    /// The memoization table starts empty; only the ancestor's promoted
    /// constants carry over.
    pub fn inherited(parent: &ResolveContext, inputs: Value, handle: Option<Handle>) -> Self {
        let shared = parent.lock_shared().clone();
        debug!(origin = "inherited", constants = shared.len(), "created resolution context");
        Self::with_shared(
            Arc::clone(&parent.inner.registry),
            inputs,
            handle,
            shared,
            ContextOrigin::Inherited,
        )
    }

    fn with_shared(
        registry: Arc<ProviderRegistry>,
        inputs: Value,
        handle: Option<Handle>,
        shared: HashMap<String, Value>,
        origin: ContextOrigin,
    ) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                registry,
                inputs,
                handle,
                shared: Mutex::new(shared),
                memo: Mutex::new(HashMap::new()),
                origin,
            }),
        }
    }

    /// How this context came to exist
    pub fn origin(&self) -> ContextOrigin {
        self.inner.origin
    }

    /// The registry this context resolves against
    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.inner.registry
    }

    /// Resolve a provider or built-in by name
    ///
    /// Resolution order: memoization table, promoted constants, built-ins,
    /// registry providers. Each name is evaluated at most once per context;
    /// a name whose resolution is already underway fails with
    /// [`Error::CyclicDependency`], and a name matching nothing fails with
    /// [`Error::UnknownDependency`].
    pub fn resolve(&self, name: &str) -> Result<Value> {
        {
            let memo = self.lock_memo();
            match memo.get(name) {
                Some(MemoEntry::Resolved(value)) => {
                    debug!(provider = name, "resolved from memo table");
                    return Ok(value.clone());
                }
                Some(MemoEntry::InProgress) => {
                    return Err(Error::cyclic_dependency(vec![name.to_string()]));
                }
                None => {}
            }
        }

        if let Some(value) = self.shared_constant(name) {
            self.memoize(name, value.clone());
            return Ok(value);
        }

        if let Some(value) = self.resolve_builtin(name) {
            self.memoize(name, value.clone());
            return Ok(value);
        }

        let Some(decl) = self.inner.registry.get(name) else {
            return Err(Error::unknown_dependency(name));
        };

        self.lock_memo()
            .insert(name.to_string(), MemoEntry::InProgress);
        debug!(provider = name, "resolving");

        let dependencies = self.resolve_all(decl.dependencies())?;
        let value = (decl.source())(&dependencies)?;

        self.memoize(name, value.clone());
        Ok(value)
    }

    /// Resolve a list of names in order, preserving declaration order for
    /// providers with ordering-sensitive side effects
    pub fn resolve_all(&self, names: &[String]) -> Result<Vec<Value>> {
        names.iter().map(|name| self.resolve(name)).collect()
    }

    /// Promote already-memoized names to constants inherited by descendant
    /// contexts; lookups of these names can never re-run their sources
    pub(crate) fn promote_shared(&self, names: &[String]) {
        let memo = self.lock_memo();
        let mut shared = self.lock_shared();
        for name in names {
            if let Some(MemoEntry::Resolved(value)) = memo.get(name) {
                shared.insert(name.clone(), value.clone());
            }
        }
    }

    fn shared_constant(&self, name: &str) -> Option<Value> {
        self.lock_shared().get(name).cloned()
    }

    fn resolve_builtin(&self, name: &str) -> Option<Value> {
        match name {
            CURRENT_INPUTS => Some(self.inner.inputs.clone()),
            CURRENT_INPUTS_WITH_HANDLE => Some(self.inputs_with_handle()),
            CURRENT_HANDLE => Some(
                self.inner
                    .handle
                    .clone()
                    .map_or(Value::Null, Value::Handle),
            ),
            CURRENT_ENVIRONMENT => Some(Value::Environment(Arc::new(self.clone()))),
            _ => None,
        }
    }

    /// Inputs merged with a `handle` field; non-map inputs pass through
    /// unchanged, and without a handle the key is simply absent
    fn inputs_with_handle(&self) -> Value {
        match (&self.inner.inputs, &self.inner.handle) {
            (Value::Map(map), Some(handle)) => {
                let mut merged = map.clone();
                merged.insert(HANDLE_INPUT_KEY.to_string(), Value::Handle(handle.clone()));
                Value::Map(merged)
            }
            _ => self.inner.inputs.clone(),
        }
    }

    fn memoize(&self, name: &str, value: Value) {
        self.lock_memo()
            .insert(name.to_string(), MemoEntry::Resolved(value));
    }

    fn lock_memo(&self) -> MutexGuard<'_, HashMap<String, MemoEntry>> {
        self.inner.memo.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_shared(&self) -> MutexGuard<'_, HashMap<String, Value>> {
        self.inner
            .shared
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Environment for ResolveContext {
    fn resolve(&self, name: &str) -> Result<Value> {
        ResolveContext::resolve(self, name)
    }

    fn inputs(&self) -> Value {
        self.inner.inputs.clone()
    }

    fn handle(&self) -> Option<Handle> {
        self.inner.handle.clone()
    }
}

impl fmt::Debug for ResolveContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolveContext")
            .field("origin", &self.inner.origin)
            .field("memoized", &self.lock_memo().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::registry::ProviderRegistry;
    use fbc_domain::HandleSlot;

    fn counting_registry(counter: Arc<AtomicUsize>) -> Arc<ProviderRegistry> {
        let registry = ProviderRegistry::builder()
            .provider("store", &[], move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Value::from("store-state"))
            })
            .provider("service", &["store"], |deps| Ok(deps[0].clone()))
            .provider("editing", &["store"], |deps| Ok(deps[0].clone()))
            .build()
            .expect("acyclic");
        Arc::new(registry)
    }

    #[test]
    fn test_each_name_resolves_at_most_once_per_context() {
        let counter = Arc::new(AtomicUsize::new(0));
        let registry = counting_registry(counter.clone());
        let ctx = ResolveContext::root(registry, Value::Null, None);

        ctx.resolve("service").expect("resolvable");
        ctx.resolve("editing").expect("resolvable");
        ctx.resolve("store").expect("resolvable");

        assert_eq!(counter.load(Ordering::SeqCst), 1, "store must run once");
    }

    #[test]
    fn test_independent_contexts_do_not_share_memoization() {
        let counter = Arc::new(AtomicUsize::new(0));
        let registry = counting_registry(counter.clone());

        ResolveContext::root(registry.clone(), Value::Null, None)
            .resolve("store")
            .expect("resolvable");
        ResolveContext::root(registry, Value::Null, None)
            .resolve("store")
            .expect("resolvable");

        assert_eq!(counter.load(Ordering::SeqCst), 2, "one run per context");
    }

    #[test]
    fn test_unknown_name_fails() {
        let registry = Arc::new(ProviderRegistry::builder().build().expect("empty"));
        let ctx = ResolveContext::root(registry, Value::Null, None);

        assert!(matches!(
            ctx.resolve("missing"),
            Err(Error::UnknownDependency { name, .. }) if name == "missing"
        ));
    }

    #[test]
    fn test_builtin_inputs_and_handle() {
        let registry = Arc::new(ProviderRegistry::builder().build().expect("empty"));
        let inputs = Value::from(json!({ "z": 1 }));
        let slot = HandleSlot::new();
        let handle = Handle::slot(slot);
        let ctx = ResolveContext::root(registry, inputs.clone(), Some(handle.clone()));

        assert_eq!(ctx.resolve(CURRENT_INPUTS).expect("builtin"), inputs);
        assert_eq!(
            ctx.resolve(CURRENT_HANDLE).expect("builtin"),
            Value::Handle(handle.clone())
        );

        let with_handle = ctx.resolve(CURRENT_INPUTS_WITH_HANDLE).expect("builtin");
        let map = with_handle.as_map().expect("map inputs stay a map");
        assert_eq!(map.get("z").and_then(Value::as_i64), Some(1));
        assert!(map.get(HANDLE_INPUT_KEY).expect("handle key").as_handle().is_some());
    }

    #[test]
    fn test_builtin_handle_absent() {
        let registry = Arc::new(ProviderRegistry::builder().build().expect("empty"));
        let ctx = ResolveContext::root(registry, Value::from(json!({ "z": 1 })), None);

        assert_eq!(ctx.resolve(CURRENT_HANDLE).expect("builtin"), Value::Null);
        let with_handle = ctx.resolve(CURRENT_INPUTS_WITH_HANDLE).expect("builtin");
        assert!(with_handle.as_map().expect("map").get(HANDLE_INPUT_KEY).is_none());
    }

    #[test]
    fn test_environment_builtin_resolves_through_same_table() {
        let counter = Arc::new(AtomicUsize::new(0));
        let registry = counting_registry(counter.clone());
        let ctx = ResolveContext::root(registry, Value::Null, None);

        let env_value = ctx.resolve(CURRENT_ENVIRONMENT).expect("builtin");
        let env = env_value.as_environment().expect("environment value");

        env.resolve("store").expect("resolvable");
        ctx.resolve("store").expect("resolvable");
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_inherited_context_carries_promoted_constants() {
        let counter = Arc::new(AtomicUsize::new(0));
        let registry = counting_registry(counter.clone());
        let parent = ResolveContext::root(registry, Value::Null, None);

        parent.resolve("store").expect("resolvable");
        parent.promote_shared(&["store".to_string()]);

        let child = ResolveContext::inherited(&parent, Value::from(json!({})), None);
        let value = child.resolve("store").expect("constant");
        assert_eq!(value, Value::from("store-state"));
        assert_eq!(counter.load(Ordering::SeqCst), 1, "constant never re-runs");
        assert_eq!(child.origin(), ContextOrigin::Inherited);
    }
}
