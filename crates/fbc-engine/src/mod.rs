//! # Feature Block Composer Engine
//!
//! Dependency-injection engine for composing independently-defined behavior
//! providers into fully-assembled building blocks. Providers declare, by
//! name, the other providers they need; the engine resolves the dependency
//! graph when a block is invoked, memoizes each provider's result for the
//! duration of that invocation, and can share a resolved subset with every
//! nested invocation.
//!
//! ## Module Categories
//!
//! ### Declaration & Validation
//! | Module | Description |
//! |--------|-------------|
//! | [`registry`] | Provider declaration table with eager graph validation |
//! | [`builtins`] | The fixed built-in provider vocabulary |
//!
//! ### Resolution
//! | Module | Description |
//! |--------|-------------|
//! | [`context`] | Per-invocation memoization and lookup environment |
//! | [`apply`] | Provider applier producing invocable wrapped providers |
//! | [`share`] | Scope propagator sharing resolved subsets with descendants |
//!
//! ### Block Assembly
//! | Module | Description |
//! |--------|-------------|
//! | [`block`] | Building blocks and the render-stage composer |
//! | [`inject`] | Property-map injection of resolved values into inputs |
//! | [`engine`] | Facade binding one registry to all operations |

pub mod apply;
pub mod block;
pub mod builtins;
pub mod context;
pub mod engine;
pub mod inject;
pub mod registry;
pub mod share;

pub use apply::{AppliedBlock, ApplyOptions};
pub use block::{wrap_render, Block, RenderFn};
pub use builtins::{EnvMode, BUILTIN_NAMES};
pub use context::{ContextOrigin, ResolveContext};
pub use engine::Engine;
pub use inject::{inject, inject_by_map, injector_provider, PropsMap};
pub use registry::{ProviderDecl, ProviderFn, ProviderRegistry, RegistryBuilder};
pub use share::share_providers;
