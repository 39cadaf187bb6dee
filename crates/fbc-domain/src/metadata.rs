//! Building-block metadata
//!
//! Every building block carries an explicit [`BlockMetadata`]: the display
//! label shown in diagnostics and an optional table of default inputs.
//! Wrappers merge the wrapped block's metadata into their own by plain field
//! copy, so a composed block stays indistinguishable from its source to any
//! code that introspects it.

use crate::value::ValueMap;

/// Introspectable metadata attached to a building block
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockMetadata {
    /// Human-readable label; wrappers derive a composed form of it
    pub display_name: Option<String>,
    /// Declarative defaults filled into missing input keys at invocation
    pub default_inputs: Option<ValueMap>,
}

impl BlockMetadata {
    /// Metadata with just a display label
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            display_name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Metadata with a display label and a default-input table
    pub fn with_defaults(name: impl Into<String>, defaults: ValueMap) -> Self {
        Self {
            display_name: Some(name.into()),
            default_inputs: Some(defaults),
        }
    }

    /// Copy fields from a wrapped block's metadata where this one has none
    ///
    /// The wrapper's own fields win on conflict. The display label is exempt
    /// from that rule: callers derive it with [`BlockMetadata::composed_label`]
    /// afterwards so it always reflects the composition.
    pub fn merge_from(&mut self, base: &BlockMetadata) {
        if self.display_name.is_none() {
            self.display_name = base.display_name.clone();
        }
        if self.default_inputs.is_none() {
            self.default_inputs = base.default_inputs.clone();
        }
    }

    /// Derive the `Wrapper(Base)` display label for a composed block
    pub fn composed_label(wrapper: &str, base: &BlockMetadata) -> String {
        let base_name = base.display_name.as_deref().unwrap_or("anonymous");
        format!("{wrapper}({base_name})")
    }

    /// The display label, or `"anonymous"` when none is set
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or("anonymous")
    }
}
