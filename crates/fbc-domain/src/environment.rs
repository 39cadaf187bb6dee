//! Ambient environment port
//!
//! The view a provider gets of the resolution machinery when it depends on
//! the environment built-in. The engine's resolution context implements this
//! trait; provider code only ever sees the trait object, so the domain layer
//! stays free of engine internals.

use crate::error::Result;
use crate::handle::Handle;
use crate::value::Value;

/// Resolve-by-name view of the current invocation's environment
///
/// Lookups go through the invocation's memoization table, so resolving a name
/// here costs nothing when a sibling dependency already resolved it.
pub trait Environment: Send + Sync {
    /// Resolve a provider or built-in by name within the current invocation
    fn resolve(&self, name: &str) -> Result<Value>;

    /// The current invocation's input values
    fn inputs(&self) -> Value;

    /// The current external handle, when the invocation carries one
    fn handle(&self) -> Option<Handle>;
}
