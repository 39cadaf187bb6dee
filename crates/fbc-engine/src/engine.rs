//! Engine facade
//!
//! One [`Engine`] binds a validated registry and hands out the composition
//! operations, so call sites never thread the registry by hand.

use std::sync::Arc;

use fbc_domain::{BlockMetadata, Error, Result, Value};

use crate::apply::{AppliedBlock, ApplyOptions};
use crate::block::Block;
use crate::registry::ProviderRegistry;
use crate::share::share_providers;

/// Composition engine bound to one provider registry
pub struct Engine {
    registry: Arc<ProviderRegistry>,
}

impl Engine {
    /// Bind a validated registry
    pub fn new(registry: ProviderRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// The bound registry
    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    /// Wrap a provider function with dependency resolution
    ///
    /// `base_metadata` is the metadata of the source being wrapped; the
    /// applied block exposes it under a composed display label.
    pub fn apply(
        &self,
        base_metadata: &BlockMetadata,
        source: impl Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
        dependencies: &[&str],
        options: ApplyOptions,
    ) -> Result<AppliedBlock> {
        AppliedBlock::wrap(
            Arc::clone(&self.registry),
            base_metadata,
            Arc::new(source),
            dependencies.iter().map(ToString::to_string).collect(),
            options,
        )
    }

    /// Wrap a registry provider as a standalone callable
    ///
    /// Uses the provider's declared dependencies and its name as metadata.
    pub fn apply_named(&self, name: &str, options: ApplyOptions) -> Result<AppliedBlock> {
        let decl = self
            .registry
            .get(name)
            .ok_or_else(|| Error::unknown_dependency(name))?;
        AppliedBlock::wrap(
            Arc::clone(&self.registry),
            &BlockMetadata::named(decl.name()),
            decl.source().clone(),
            decl.dependencies().to_vec(),
            options,
        )
    }

    /// Wrap a building block in a sharing boundary for `names`
    pub fn share(&self, block: Block, names: &[&str]) -> Result<Block> {
        share_providers(&self.registry, block, names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_named_uses_declared_dependencies() {
        let registry = ProviderRegistry::builder()
            .provider("store", &[], |_| Ok(Value::from("state")))
            .provider("service", &["store"], |deps| Ok(deps[0].clone()))
            .build()
            .expect("acyclic");
        let engine = Engine::new(registry);

        let applied = engine
            .apply_named("service", ApplyOptions::default())
            .expect("declared provider");
        assert_eq!(applied.dependencies(), &["store".to_string()]);
        assert_eq!(
            applied.metadata().display_name.as_deref(),
            Some("ApplyProviders(service)")
        );
        assert_eq!(applied.invoke(Value::Null).expect("resolvable"), Value::from("state"));
    }

    #[test]
    fn test_apply_named_unknown_provider() {
        let engine = Engine::new(ProviderRegistry::builder().build().expect("empty"));
        assert!(matches!(
            engine.apply_named("missing", ApplyOptions::default()),
            Err(Error::UnknownDependency { .. })
        ));
    }
}
