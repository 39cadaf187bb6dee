//! Provider applier
//!
//! Wraps a provider function so that, at invocation time, it locates or
//! creates a [`ResolveContext`], resolves its declared dependencies through
//! the context's memoization table, and calls the provider with the resolved
//! values in declared order. The wrapper is handle-aware exactly when the
//! registry closure of its dependencies can reach a handle built-in (or the
//! caller forces it), and exposes the wrapped provider's metadata under a
//! composed display label.

use std::sync::Arc;

use tracing::debug;

use fbc_domain::{BlockMetadata, Error, Handle, Result, Value};

use crate::builtins::{is_builtin, is_handle_builtin, EnvMode};
use crate::context::ResolveContext;
use crate::registry::{ProviderFn, ProviderRegistry};

/// Options for wrapping a provider
#[derive(Clone, Default)]
pub struct ApplyOptions {
    /// Force the wrapper's handle mode instead of deriving it from the
    /// registry closure of the declared dependencies
    pub handle_needed: Option<bool>,
    /// Wrapper-owned observer fused with the caller's handle, so both see
    /// assignments made by the composed instance
    pub observer: Option<Handle>,
}

impl ApplyOptions {
    /// Force handle support on or off
    pub fn with_handle_needed(mut self, needed: bool) -> Self {
        self.handle_needed = Some(needed);
        self
    }

    /// Attach a wrapper-owned observer handle
    pub fn with_observer(mut self, observer: Handle) -> Self {
        self.observer = Some(observer);
        self
    }
}

/// A provider wrapped for invocation against a registry
#[derive(Clone)]
pub struct AppliedBlock {
    metadata: BlockMetadata,
    source: ProviderFn,
    dependencies: Vec<String>,
    registry: Arc<ProviderRegistry>,
    mode: EnvMode,
    observer: Option<Handle>,
}

impl AppliedBlock {
    /// Wrap `source` so invocation resolves `dependencies` first
    ///
    /// Fails with [`Error::UnknownDependency`] when a declared dependency
    /// names neither a registry provider nor a built-in.
    pub fn wrap(
        registry: Arc<ProviderRegistry>,
        base_metadata: &BlockMetadata,
        source: ProviderFn,
        dependencies: Vec<String>,
        options: ApplyOptions,
    ) -> Result<Self> {
        for dependency in &dependencies {
            if !is_builtin(dependency) && !registry.contains(dependency) {
                return Err(Error::unknown_dependency(dependency));
            }
        }

        let mode = match options.handle_needed {
            Some(true) => EnvMode::WithHandle,
            Some(false) => EnvMode::WithoutHandle,
            None => {
                let closure = registry.transitive_dependencies(&dependencies);
                if closure.iter().any(|name| is_handle_builtin(name)) {
                    EnvMode::WithHandle
                } else {
                    EnvMode::WithoutHandle
                }
            }
        };

        let mut metadata = BlockMetadata::default();
        metadata.merge_from(base_metadata);
        metadata.display_name = Some(BlockMetadata::composed_label("ApplyProviders", base_metadata));

        Ok(Self {
            metadata,
            source,
            dependencies,
            registry,
            mode,
            observer: options.observer,
        })
    }

    /// The wrapper's introspectable metadata
    pub fn metadata(&self) -> &BlockMetadata {
        &self.metadata
    }

    /// The wrapper's handle mode
    pub fn env_mode(&self) -> EnvMode {
        self.mode
    }

    /// Dependency names in declared order
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// Invoke without a handle, in a fresh context
    pub fn invoke(&self, inputs: Value) -> Result<Value> {
        self.invoke_in(inputs, None, None)
    }

    /// Invoke with an external handle, in a fresh context
    pub fn invoke_with_handle(&self, inputs: Value, handle: Handle) -> Result<Value> {
        self.invoke_in(inputs, Some(handle), None)
    }

    /// Invoke, reusing the ambient context when one is supplied
    ///
    /// A supplied context is by construction a resolution root; a second one
    /// is never created for the same invocation. In `WithoutHandle` mode any
    /// handle argument is ignored.
    pub fn invoke_in(
        &self,
        inputs: Value,
        handle: Option<Handle>,
        ambient: Option<&ResolveContext>,
    ) -> Result<Value> {
        let handle = match self.mode {
            EnvMode::WithoutHandle => None,
            EnvMode::WithHandle => match (&self.observer, handle) {
                (None, caller) => caller,
                (Some(observer), None) => Some(observer.clone()),
                (Some(observer), Some(caller)) => {
                    Some(Handle::combined(Some(observer), Some(&caller)))
                }
            },
        };

        let created;
        let ctx = match ambient {
            Some(ctx) => {
                debug!(block = self.metadata.label(), "reusing ambient resolution context");
                ctx
            }
            None => {
                created = ResolveContext::root(Arc::clone(&self.registry), inputs, handle);
                &created
            }
        };

        let dependencies = ctx.resolve_all(&self.dependencies)?;
        (self.source)(&dependencies)
    }
}
