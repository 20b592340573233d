//! # Filters
//!
//! Cross-cutting steps wrapped around every dispatch, in three roles:
//!
//! - [`PreHandleFilter`] - runs before the handler; failing short-circuits it
//! - [`PostHandleFilter`] - runs after a successful handler and sees the result
//! - [`ErrorFilter`] - observes a failure and decides whether it propagates
//!
//! Each role has one method per message kind with a no-op default, so a filter
//! only overrides what it cares about. Filters see the message as
//! `&dyn Message`; downcast through [`AnyMessage::as_any`] when the concrete
//! type matters.
//!
//! # Swallowing failures
//!
//! Error filters return an [`ErrorDisposition`]. Every error filter sees the
//! failure; it is swallowed if at least one of them returns
//! [`ErrorDisposition::Handled`]. A swallowed command or query completes with
//! the default value of its output type.
//!
//! [`AnyMessage::as_any`]: crate::AnyMessage::as_any

use crate::{
    cancel::CancellationToken,
    error::{BoxError, Error},
    message::{Message, MessageKind},
};
use futures::future::{BoxFuture, FutureExt};
use std::{any::Any, future::Future, sync::Arc};

/// The result of a handler as seen by post-handling filters.
///
/// Commands without a result are reported as `&()`.
pub type Outcome<'a> = &'a (dyn Any + Send + Sync);

/// What an [`ErrorFilter`] decided about a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorDisposition {
    /// Let the failure reach the caller.
    #[default]
    Propagate,
    /// The failure was dealt with; the dispatch completes normally.
    Handled,
}

/// Runs before the handler.
///
/// Returning an error short-circuits the dispatch: the handler does not run,
/// and the failure goes to the error filters.
pub trait PreHandleFilter: Send + Sync + 'static {
    /// Called before a command handler.
    fn on_command(
        &self,
        _cmd: &dyn Message,
        _cancel: &CancellationToken,
    ) -> impl Future<Output = Result<(), BoxError>> + Send {
        async { Ok(()) }
    }

    /// Called before the event handlers.
    fn on_event(
        &self,
        _evt: &dyn Message,
        _cancel: &CancellationToken,
    ) -> impl Future<Output = Result<(), BoxError>> + Send {
        async { Ok(()) }
    }

    /// Called before a query handler.
    fn on_query(
        &self,
        _query: &dyn Message,
        _cancel: &CancellationToken,
    ) -> impl Future<Output = Result<(), BoxError>> + Send {
        async { Ok(()) }
    }
}

/// Runs after a successful handler.
///
/// A failure here reaches the caller directly; the handler's result is dropped.
pub trait PostHandleFilter: Send + Sync + 'static {
    /// Called after a command handler succeeded.
    fn on_command(
        &self,
        _cmd: &dyn Message,
        _result: Outcome<'_>,
        _cancel: &CancellationToken,
    ) -> impl Future<Output = Result<(), BoxError>> + Send {
        async { Ok(()) }
    }

    /// Called after every event handler succeeded.
    fn on_event(
        &self,
        _evt: &dyn Message,
        _cancel: &CancellationToken,
    ) -> impl Future<Output = Result<(), BoxError>> + Send {
        async { Ok(()) }
    }

    /// Called after a query handler succeeded.
    fn on_query(
        &self,
        _query: &dyn Message,
        _result: Outcome<'_>,
        _cancel: &CancellationToken,
    ) -> impl Future<Output = Result<(), BoxError>> + Send {
        async { Ok(()) }
    }
}

/// Observes failures raised by the handler or by a pre-handling filter.
///
/// Returning an error replaces the original failure and stops the remaining
/// error filters.
pub trait ErrorFilter: Send + Sync + 'static {
    /// Called when handling a command failed.
    fn on_command(
        &self,
        _cmd: &dyn Message,
        _error: &Error,
        _cancel: &CancellationToken,
    ) -> impl Future<Output = Result<ErrorDisposition, BoxError>> + Send {
        async { Ok(ErrorDisposition::Propagate) }
    }

    /// Called when handling an event failed.
    fn on_event(
        &self,
        _evt: &dyn Message,
        _error: &Error,
        _cancel: &CancellationToken,
    ) -> impl Future<Output = Result<ErrorDisposition, BoxError>> + Send {
        async { Ok(ErrorDisposition::Propagate) }
    }

    /// Called when handling a query failed.
    fn on_query(
        &self,
        _query: &dyn Message,
        _error: &Error,
        _cancel: &CancellationToken,
    ) -> impl Future<Output = Result<ErrorDisposition, BoxError>> + Send {
        async { Ok(ErrorDisposition::Propagate) }
    }
}

// Shared filters are filters too.
impl<T: PreHandleFilter> PreHandleFilter for Arc<T> {
    fn on_command(
        &self,
        cmd: &dyn Message,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<(), BoxError>> + Send {
        (**self).on_command(cmd, cancel)
    }

    fn on_event(
        &self,
        evt: &dyn Message,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<(), BoxError>> + Send {
        (**self).on_event(evt, cancel)
    }

    fn on_query(
        &self,
        query: &dyn Message,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<(), BoxError>> + Send {
        (**self).on_query(query, cancel)
    }
}

impl<T: PostHandleFilter> PostHandleFilter for Arc<T> {
    fn on_command(
        &self,
        cmd: &dyn Message,
        result: Outcome<'_>,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<(), BoxError>> + Send {
        (**self).on_command(cmd, result, cancel)
    }

    fn on_event(
        &self,
        evt: &dyn Message,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<(), BoxError>> + Send {
        (**self).on_event(evt, cancel)
    }

    fn on_query(
        &self,
        query: &dyn Message,
        result: Outcome<'_>,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<(), BoxError>> + Send {
        (**self).on_query(query, result, cancel)
    }
}

impl<T: ErrorFilter> ErrorFilter for Arc<T> {
    fn on_command(
        &self,
        cmd: &dyn Message,
        error: &Error,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<ErrorDisposition, BoxError>> + Send {
        (**self).on_command(cmd, error, cancel)
    }

    fn on_event(
        &self,
        evt: &dyn Message,
        error: &Error,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<ErrorDisposition, BoxError>> + Send {
        (**self).on_event(evt, error, cancel)
    }

    fn on_query(
        &self,
        query: &dyn Message,
        error: &Error,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<ErrorDisposition, BoxError>> + Send {
        (**self).on_query(query, error, cancel)
    }
}

// ============================================================================
// Object-safe forms
// ============================================================================

/// Object-safe form of [`PreHandleFilter`].
pub trait DynPreHandleFilter: Send + Sync + 'static {
    /// Run the method matching `kind`.
    fn pre_handle<'a>(
        &'a self,
        kind: MessageKind,
        message: &'a dyn Message,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<(), BoxError>>;
}

impl<T: PreHandleFilter> DynPreHandleFilter for T {
    fn pre_handle<'a>(
        &'a self,
        kind: MessageKind,
        message: &'a dyn Message,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<(), BoxError>> {
        match kind {
            MessageKind::Command => self.on_command(message, cancel).boxed(),
            MessageKind::Event => self.on_event(message, cancel).boxed(),
            MessageKind::Query => self.on_query(message, cancel).boxed(),
        }
    }
}

/// Object-safe form of [`PostHandleFilter`].
pub trait DynPostHandleFilter: Send + Sync + 'static {
    /// Run the method matching `kind`. Events ignore `result`.
    fn post_handle<'a>(
        &'a self,
        kind: MessageKind,
        message: &'a dyn Message,
        result: Outcome<'a>,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<(), BoxError>>;
}

impl<T: PostHandleFilter> DynPostHandleFilter for T {
    fn post_handle<'a>(
        &'a self,
        kind: MessageKind,
        message: &'a dyn Message,
        result: Outcome<'a>,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<(), BoxError>> {
        match kind {
            MessageKind::Command => self.on_command(message, result, cancel).boxed(),
            MessageKind::Event => self.on_event(message, cancel).boxed(),
            MessageKind::Query => self.on_query(message, result, cancel).boxed(),
        }
    }
}

/// Object-safe form of [`ErrorFilter`].
pub trait DynErrorFilter: Send + Sync + 'static {
    /// Run the method matching `kind`.
    fn on_error<'a>(
        &'a self,
        kind: MessageKind,
        message: &'a dyn Message,
        error: &'a Error,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<ErrorDisposition, BoxError>>;
}

impl<T: ErrorFilter> DynErrorFilter for T {
    fn on_error<'a>(
        &'a self,
        kind: MessageKind,
        message: &'a dyn Message,
        error: &'a Error,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<ErrorDisposition, BoxError>> {
        match kind {
            MessageKind::Command => self.on_command(message, error, cancel).boxed(),
            MessageKind::Event => self.on_event(message, error, cancel).boxed(),
            MessageKind::Query => self.on_query(message, error, cancel).boxed(),
        }
    }
}

/// A boxed [`DynPreHandleFilter`].
pub type BoxPreHandleFilter = Box<dyn DynPreHandleFilter>;
/// A boxed [`DynPostHandleFilter`].
pub type BoxPostHandleFilter = Box<dyn DynPostHandleFilter>;
/// A boxed [`DynErrorFilter`].
pub type BoxErrorFilter = Box<dyn DynErrorFilter>;
