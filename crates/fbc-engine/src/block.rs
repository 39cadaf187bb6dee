//! Building blocks
//!
//! A [`Block`] is metadata plus an opaque render operation. The engine calls
//! the render with a computed set of inputs and never inspects what it
//! produces; the extra handle and ambient-context parameters exist only so
//! wrappers can thread composition state through to nested invocations.

use std::sync::Arc;

use fbc_domain::{BlockMetadata, Handle, Result, Value, ValueMap};

use crate::apply::AppliedBlock;
use crate::context::ResolveContext;

/// Render operation of a building block
pub type RenderFn =
    Arc<dyn Fn(Value, Option<&Handle>, Option<&ResolveContext>) -> Result<Value> + Send + Sync>;

/// A building block: introspectable metadata plus an opaque render
#[derive(Clone)]
pub struct Block {
    metadata: BlockMetadata,
    render: RenderFn,
}

impl Block {
    /// Build a block from a composition-aware render
    pub fn new(
        metadata: BlockMetadata,
        render: impl Fn(Value, Option<&Handle>, Option<&ResolveContext>) -> Result<Value>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            metadata,
            render: Arc::new(render),
        }
    }

    /// Build a block from a plain external render collaborator
    ///
    /// The collaborator sees only the merged inputs; handle and ambient
    /// context never reach it.
    pub fn from_render(
        metadata: BlockMetadata,
        render: impl Fn(&Value) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        Self::new(metadata, move |inputs, _, _| render(&inputs))
    }

    /// The block's introspectable metadata
    pub fn metadata(&self) -> &BlockMetadata {
        &self.metadata
    }

    /// Invoke without a handle or ambient context
    pub fn invoke(&self, inputs: Value) -> Result<Value> {
        self.invoke_in(inputs, None, None)
    }

    /// Invoke with an external handle
    pub fn invoke_with_handle(&self, inputs: Value, handle: &Handle) -> Result<Value> {
        self.invoke_in(inputs, Some(handle), None)
    }

    /// Invoke, filling missing input keys from the default-input table first
    pub fn invoke_in(
        &self,
        inputs: Value,
        handle: Option<&Handle>,
        ambient: Option<&ResolveContext>,
    ) -> Result<Value> {
        (self.render)(self.fill_defaults(inputs), handle, ambient)
    }

    fn fill_defaults(&self, inputs: Value) -> Value {
        let Some(defaults) = &self.metadata.default_inputs else {
            return inputs;
        };
        match inputs {
            Value::Map(mut map) => {
                for (key, value) in defaults {
                    if !map.contains_key(key) {
                        map.insert(key.clone(), value.clone());
                    }
                }
                Value::Map(map)
            }
            Value::Null => Value::Map(defaults.clone()),
            other => other,
        }
    }
}

/// Compose a props-computing applied provider with a building block
///
/// The result invokes `applied` on the inputs (inheriting any ambient
/// context) and renders `block` with whatever it returns. When `defaults` is
/// given it becomes the composed block's default-input table; otherwise the
/// inner block's table copies through.
pub fn wrap_render(applied: AppliedBlock, block: Block, defaults: Option<ValueMap>) -> Block {
    let mut metadata = BlockMetadata {
        display_name: None,
        default_inputs: defaults,
    };
    metadata.merge_from(block.metadata());
    metadata.display_name = Some(BlockMetadata::composed_label("ApplyRender", block.metadata()));

    Block::new(metadata, move |inputs, handle, ambient| {
        let merged = applied.invoke_in(inputs, handle.cloned(), ambient)?;
        block.invoke_in(merged, handle, ambient)
    })
}
