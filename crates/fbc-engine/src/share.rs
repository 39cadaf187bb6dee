//! Scope propagator
//!
//! Wraps a building block so a named subset of providers is resolved once,
//! eagerly, at the top of the block's invocation and made available as
//! constants to everything nested underneath. Nested appliers receive the
//! boundary's context and reuse it, so the subset is computed exactly once
//! per boundary invocation regardless of how many descendants depend on it.

use std::sync::Arc;

use tracing::debug;

use fbc_domain::{BlockMetadata, Error, Result};

use crate::block::Block;
use crate::builtins::is_builtin;
use crate::context::ResolveContext;
use crate::registry::ProviderRegistry;

/// Wrap `block` so `names` resolve once per invocation and are shared beneath
///
/// A boundary always starts a new sharing scope: at the top level it creates
/// a root context, and under an enclosing boundary it creates an inherited
/// one so the outer boundary's constants stay visible.
///
/// Fails with [`Error::UnknownDependency`] when a name matches neither a
/// registry provider nor a built-in.
pub fn share_providers(
    registry: &Arc<ProviderRegistry>,
    block: Block,
    names: &[&str],
) -> Result<Block> {
    for name in names {
        if !is_builtin(name) && !registry.contains(name) {
            return Err(Error::unknown_dependency(*name));
        }
    }
    let names: Vec<String> = names.iter().map(ToString::to_string).collect();

    let mut metadata = BlockMetadata::default();
    metadata.merge_from(block.metadata());
    metadata.display_name = Some(BlockMetadata::composed_label("ShareProviders", block.metadata()));

    let registry = Arc::clone(registry);
    Ok(Block::new(metadata, move |inputs, handle, ambient| {
        let ctx = match ambient {
            Some(parent) => ResolveContext::inherited(parent, inputs.clone(), handle.cloned()),
            None => ResolveContext::root(Arc::clone(&registry), inputs.clone(), handle.cloned()),
        };

        // Eager resolution; the values stay in the memo table
        ctx.resolve_all(&names)?;
        ctx.promote_shared(&names);
        debug!(shared = names.len(), "sharing scope established");

        block.invoke_in(inputs, handle, Some(&ctx))
    }))
}
