//! # courier - In-Process Mediator
//!
//! `courier` decouples the code that issues a request from the code that
//! handles it. Callers hand a message to a [`Mediator`]; the mediator finds
//! the handler registered for the message's runtime type and runs it inside
//! a pipeline of cross-cutting filters.
//!
//! - **Commands** ([`Command`]) reach exactly one handler, with or without a result
//! - **Events** ([`Event`]) reach zero or more handlers, in registry order
//! - **Queries** ([`Query`]) reach exactly one handler and always produce a result
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use courier::prelude::*;
//!
//! struct RegisterUser { email: String, password: String }
//! impl Message for RegisterUser {}
//! impl Command for RegisterUser { type Output = Uuid; }
//!
//! struct RegisterUserHandler;
//! impl CommandHandler<RegisterUser> for RegisterUserHandler {
//!     async fn handle(&self, cmd: &RegisterUser, cancel: &CancellationToken) -> Result<Uuid, BoxError> {
//!         cancel.ensure_active()?;
//!         Ok(Uuid::new_v4())
//!     }
//! }
//!
//! let registry = RegistryBuilder::new()
//!     .filter(LoggingFilter::new())
//!     .command::<RegisterUser, _>(RegisterUserHandler)
//!     .build()?;
//! let mediator = Mediator::new(registry);
//!
//! let id = mediator.send(&RegisterUser { .. }, &CancellationToken::new()).await?;
//! ```
//!
//! ## Filters
//!
//! Pre-handling filters run before the handler, post-handling filters after
//! a successful one, and error filters when something failed. An error
//! filter returning [`ErrorDisposition::Handled`] swallows the failure; the
//! dispatch then completes with the default value of the result type.

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod blocking;
mod mediator;
mod pipeline;

pub use mediator::{Broadcaster, Mediator, MediatorBuilder};

pub use courier_core::{
    // Message
    AnyMessage,
    // Error types
    BoxError,
    // Handler
    BoxHandler,
    // Cancellation
    CancellationExt,
    CancellationToken,
    Canceled,
    // Registry
    CapabilityKey,
    Command,
    CommandHandler,
    DynErrorFilter,
    DynHandler,
    DynPostHandleFilter,
    DynPreHandleFilter,
    Envelope,
    Error,
    // Filter
    ErrorDisposition,
    ErrorFilter,
    Event,
    EventHandler,
    FilterStage,
    HandlerRegistry,
    Message,
    MessageKind,
    MessageType,
    Outcome,
    PostHandleFilter,
    PreHandleFilter,
    Query,
    QueryHandler,
    Resolved,
    Role,
    chrono,
    erase_command,
    erase_event,
    erase_query,
    uuid,
};

pub use courier_std::{
    ConcurrentDelivery, DeliveryStrategy, EnabledHandle, FnRegistry, LoggingFilter, Registry,
    RegistryBuilder, RegistryError, RegistrationMeta, SequentialDelivery,
};

/// Delegate-backed handlers.
pub mod delegate {
    pub use courier_std::delegate::{
        DelegateCommandHandler, DelegateEventHandler, DelegateQueryHandler, command, event, query,
    };
}

/// Testing utilities.
pub mod testing {
    pub use courier_std::testing::{CountingHandler, Journal, RecordingFilter, token_addr};
}

/// Prelude module - common imports for Courier.
///
/// # Usage
///
/// ```rust,ignore
/// use courier::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Errors
        BoxError,
        // Cancellation
        CancellationExt,
        CancellationToken,
        Canceled,
        // Core traits
        Command,
        CommandHandler,
        Envelope,
        Error,
        ErrorDisposition,
        ErrorFilter,
        Event,
        EventHandler,
        LoggingFilter,
        // Mediator
        Mediator,
        Message,
        PostHandleFilter,
        PreHandleFilter,
        Query,
        QueryHandler,
        RegistryBuilder,
        uuid::Uuid,
    };
}

#[cfg(feature = "macros")]
pub use courier_macros::{Command, Event, Message, Query};
