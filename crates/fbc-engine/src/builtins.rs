//! Built-in provider names
//!
//! The fixed, case-sensitive vocabulary every resolution context exposes
//! alongside the registry's own providers. Registries may depend on these
//! names but never redefine them.

/// The current invocation's inputs
pub const CURRENT_INPUTS: &str = "currentInputs";

/// The current invocation's inputs merged with a `handle` field
pub const CURRENT_INPUTS_WITH_HANDLE: &str = "currentInputsWithHandle";

/// The current external handle, or `Null` when the invocation has none
pub const CURRENT_HANDLE: &str = "currentHandle";

/// The ambient environment itself
pub const CURRENT_ENVIRONMENT: &str = "currentEnvironment";

/// All built-in names
pub const BUILTIN_NAMES: [&str; 4] = [
    CURRENT_INPUTS,
    CURRENT_INPUTS_WITH_HANDLE,
    CURRENT_HANDLE,
    CURRENT_ENVIRONMENT,
];

/// Key under which `currentInputsWithHandle` merges the handle into inputs
pub const HANDLE_INPUT_KEY: &str = "handle";

/// True if `name` is a built-in provider name
pub fn is_builtin(name: &str) -> bool {
    BUILTIN_NAMES.contains(&name)
}

/// True if `name` is a built-in that exposes the external handle
pub fn is_handle_builtin(name: &str) -> bool {
    name == CURRENT_HANDLE || name == CURRENT_INPUTS_WITH_HANDLE
}

/// How an applied provider's wrapper treats the external handle
///
/// Selected once at wrap time from the registry closure of the declared
/// dependencies: if the closure can reach a handle built-in the wrapper
/// threads the caller's handle through resolution, otherwise it ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvMode {
    /// Thread the caller-supplied handle into the resolution context
    WithHandle,
    /// Ignore any handle argument
    WithoutHandle,
}
