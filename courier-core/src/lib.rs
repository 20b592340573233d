//! # courier-core
//!
//! Core contracts for the Courier in-process mediator.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! libraries that define messages, handlers or filters without depending on
//! the mediator itself.
//!
//! # Contracts
//!
//! ## Messages ([`Command`], [`Event`], [`Query`])
//!
//! Marker traits over [`Message`]. Commands and queries declare the result
//! they produce; events produce nothing. An [`Envelope`] carries the usual
//! identity fields (id, creation time, creator).
//!
//! ## Handlers ([`CommandHandler`], [`EventHandler`], [`QueryHandler`])
//!
//! The terminal step of a dispatch. One async operation each, receiving the
//! message by reference together with the dispatch's [`CancellationToken`].
//!
//! ## Filters ([`PreHandleFilter`], [`PostHandleFilter`], [`ErrorFilter`])
//!
//! Cross-cutting steps wrapped around every dispatch.
//!
//! ## Registry ([`HandlerRegistry`])
//!
//! Resolves handlers and filters by [`CapabilityKey`]: a (role, concrete
//! message type) pair.
//!
//! # Error Types
//!
//! - [`Error`] - Everything a dispatch can fail with
//! - [`Canceled`] - Returned by steps that observe cancellation

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod cancel;
mod capability;
mod envelope;
mod error;
mod filter;
mod handler;
mod message;
mod registry;

// Re-exports
pub use cancel::{CancellationExt, CancellationToken};
pub use capability::{CapabilityKey, MessageType, Role};
pub use envelope::Envelope;
pub use error::{BoxError, Canceled, Error, FilterStage};
pub use filter::{
    BoxErrorFilter, BoxPostHandleFilter, BoxPreHandleFilter, DynErrorFilter, DynPostHandleFilter,
    DynPreHandleFilter, ErrorDisposition, ErrorFilter, Outcome, PostHandleFilter, PreHandleFilter,
};
pub use handler::{
    BoxHandler, CommandHandler, DynHandler, EventHandler, MessageMismatch, QueryHandler,
    erase_command, erase_event, erase_query,
};
pub use message::{AnyMessage, Command, Event, Message, MessageKind, Query};
pub use registry::{HandlerRegistry, Resolved};

/// Re-exported for messages that carry an [`Envelope`].
pub use chrono;
/// Re-exported for messages that carry an [`Envelope`].
pub use uuid;
