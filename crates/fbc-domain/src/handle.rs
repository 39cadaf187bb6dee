//! External resource handles
//!
//! A [`Handle`] is the caller's window into an instance the engine assembles
//! but never interprets: either an assignable slot the caller reads later, or
//! a callback invoked with each assigned value. [`Handle::combined`] fuses two
//! optional handles into one setter so a wrapper and an outer caller can both
//! observe the same instance.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::value::Value;

/// Assignable holder for the most recently assigned value
///
/// Clones share the same underlying slot, so a caller keeps one clone and
/// reads back whatever the composition assigned.
#[derive(Clone, Default)]
pub struct HandleSlot {
    current: Arc<RwLock<Option<Value>>>,
}

impl HandleSlot {
    /// Create an empty slot
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently assigned value, if any
    pub fn current(&self) -> Option<Value> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, value: Value) {
        *self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(value);
    }
}

impl fmt::Debug for HandleSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HandleSlot").field(&self.current()).finish()
    }
}

/// External resource reference supplied by an invocation's caller
#[derive(Clone)]
pub enum Handle {
    /// Assignable slot; assignment stores the value
    Slot(HandleSlot),
    /// Callback; assignment invokes it with the value
    Callback(Arc<dyn Fn(Value) + Send + Sync>),
}

impl Handle {
    /// Create a slot-backed handle
    pub fn slot(slot: HandleSlot) -> Self {
        Self::Slot(slot)
    }

    /// Create a callback-backed handle
    pub fn callback(f: impl Fn(Value) + Send + Sync + 'static) -> Self {
        Self::Callback(Arc::new(f))
    }

    /// Assign a value: store it in a slot, or invoke a callback with it
    pub fn assign(&self, value: Value) {
        match self {
            Self::Slot(slot) => slot.set(value),
            Self::Callback(f) => f(value),
        }
    }

    /// Fuse two optional handles into one setter forwarding to both
    ///
    /// An absent side is a no-op, not an error.
    pub fn combined(a: Option<&Handle>, b: Option<&Handle>) -> Handle {
        let a = a.cloned();
        let b = b.cloned();
        Self::callback(move |value: Value| {
            if let Some(handle) = &a {
                handle.assign(value.clone());
            }
            if let Some(handle) = &b {
                handle.assign(value);
            }
        })
    }

    /// Identity comparison: true when both refer to the same slot or callback
    pub fn same(&self, other: &Handle) -> bool {
        match (self, other) {
            (Self::Slot(a), Self::Slot(b)) => Arc::ptr_eq(&a.current, &b.current),
            (Self::Callback(a), Self::Callback(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Slot(slot) => f.debug_tuple("Slot").field(slot).finish(),
            Self::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}
