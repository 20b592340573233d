//! # courier-std
//!
//! Standard implementations for the Courier mediator.
//!
//! This crate provides:
//! - **Registries**: [`Registry`] built with [`RegistryBuilder`], and the
//!   closure-backed [`FnRegistry`]
//! - **Delegate handlers**: plain async functions as handlers, see [`delegate`]
//! - **Event delivery**: [`SequentialDelivery`], [`ConcurrentDelivery`]
//! - **Standard filters**: [`LoggingFilter`]
//! - **Testing utilities**: see [`testing`]

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use courier_core;

// Modules
pub mod delegate;
pub mod delivery;
pub mod filters;
pub mod registry;
pub mod resolver;
pub mod testing;

pub use delivery::{ConcurrentDelivery, DeliveryStrategy, SequentialDelivery};
pub use filters::LoggingFilter;
pub use registry::{EnabledHandle, Registry, RegistryBuilder, RegistryError, RegistrationMeta};
pub use resolver::FnRegistry;
