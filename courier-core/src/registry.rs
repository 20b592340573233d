//! The handler registry contract.
//!
//! A registry maps [`CapabilityKey`]s to handler and filter instances. The
//! mediator consumes it through [`HandlerRegistry`] only; how instances are
//! built, cached or scoped is up to the implementation.
//!
//! # What the mediator expects back
//!
//! | Key role | Resolved instance |
//! |---|---|
//! | `Command` / `Query` with output `R` | [`BoxHandler<R>`] |
//! | `Event` | [`BoxHandler<()>`] |
//! | `PreFilter` | [`BoxPreHandleFilter`] |
//! | `PostFilter` | [`BoxPostHandleFilter`] |
//! | `ErrorFilter` | [`BoxErrorFilter`] |
//!
//! [`BoxHandler<R>`]: crate::BoxHandler
//! [`BoxHandler<()>`]: crate::BoxHandler
//! [`BoxPreHandleFilter`]: crate::BoxPreHandleFilter
//! [`BoxPostHandleFilter`]: crate::BoxPostHandleFilter
//! [`BoxErrorFilter`]: crate::BoxErrorFilter

use crate::capability::CapabilityKey;
use std::{any::Any, fmt, sync::Arc};

/// A type-erased instance produced by a registry.
pub struct Resolved(Box<dyn Any + Send + Sync>);

impl Resolved {
    /// Wrap an instance.
    pub fn new<T: Any + Send + Sync>(instance: T) -> Self {
        Self(Box::new(instance))
    }

    /// Recover the instance, or get `self` back if it is not a `T`.
    pub fn downcast<T: Any>(self) -> Result<T, Self> {
        match self.0.downcast::<T>() {
            Ok(instance) => Ok(*instance),
            Err(other) => Err(Self(other)),
        }
    }

    /// Whether the instance is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.0.is::<T>()
    }
}

impl fmt::Debug for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolved").finish_non_exhaustive()
    }
}

/// Resolves handlers and filters by capability.
///
/// Both operations must be safe to call concurrently. `resolve_all` must
/// return instances in a stable order (typically registration order); the
/// mediator runs filters and event handlers in exactly that order.
pub trait HandlerRegistry: Send + Sync + 'static {
    /// Resolve the single instance registered for `key`.
    fn resolve_one(&self, key: &CapabilityKey) -> Option<Resolved>;

    /// Resolve every instance registered for `key`, in order.
    fn resolve_all(&self, key: &CapabilityKey) -> Vec<Resolved>;
}

impl<R: HandlerRegistry + ?Sized> HandlerRegistry for Arc<R> {
    fn resolve_one(&self, key: &CapabilityKey) -> Option<Resolved> {
        (**self).resolve_one(key)
    }

    fn resolve_all(&self, key: &CapabilityKey) -> Vec<Resolved> {
        (**self).resolve_all(key)
    }
}

impl<R: HandlerRegistry + ?Sized> HandlerRegistry for Box<R> {
    fn resolve_one(&self, key: &CapabilityKey) -> Option<Resolved> {
        (**self).resolve_one(key)
    }

    fn resolve_all(&self, key: &CapabilityKey) -> Vec<Resolved> {
        (**self).resolve_all(key)
    }
}
