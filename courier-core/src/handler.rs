//! # Handlers
//!
//! The terminal point of a dispatch: where business logic executes.
//!
//! Each handler implements exactly one capability:
//!
//! - [`CommandHandler<C>`] - the single handler of command `C`
//! - [`EventHandler<E>`] - one of any number of handlers of event `E`
//! - [`QueryHandler<Q>`] - the single handler of query `Q`
//!
//! # Static vs Dynamic Dispatch
//!
//! The handler traits use native `async fn` for zero-cost static dispatch.
//! Registries store handlers behind [`DynHandler`], the object-safe form
//! that accepts the message as `&dyn Message` and downcasts it back to the
//! concrete type. Use [`erase_command`], [`erase_event`] and [`erase_query`]
//! to produce one.

use crate::{
    cancel::CancellationToken,
    error::BoxError,
    message::{Command, Event, Message, Query},
};
use futures::future::{BoxFuture, FutureExt};
use std::{future::Future, marker::PhantomData, sync::Arc};

/// Handles one command type.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot handle command `{C}`",
    label = "missing `CommandHandler<{C}>` implementation",
    note = "Command handlers must implement `handle` for `{C}`."
)]
pub trait CommandHandler<C: Command>: Send + Sync + 'static {
    /// Execute the command.
    fn handle(
        &self,
        cmd: &C,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<C::Output, BoxError>> + Send;
}

/// Handles one event type.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot handle event `{E}`",
    label = "missing `EventHandler<{E}>` implementation",
    note = "Event handlers must implement `handle` for `{E}`."
)]
pub trait EventHandler<E: Event>: Send + Sync + 'static {
    /// React to the event.
    fn handle(
        &self,
        evt: &E,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<(), BoxError>> + Send;
}

/// Handles one query type.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot handle query `{Q}`",
    label = "missing `QueryHandler<{Q}>` implementation",
    note = "Query handlers must implement `handle` for `{Q}`."
)]
pub trait QueryHandler<Q: Query>: Send + Sync + 'static {
    /// Answer the query.
    fn handle(
        &self,
        query: &Q,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<Q::Output, BoxError>> + Send;
}

// Shared handlers are handlers too.
impl<C: Command, H: CommandHandler<C>> CommandHandler<C> for Arc<H> {
    fn handle(
        &self,
        cmd: &C,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<C::Output, BoxError>> + Send {
        (**self).handle(cmd, cancel)
    }
}

impl<E: Event, H: EventHandler<E>> EventHandler<E> for Arc<H> {
    fn handle(
        &self,
        evt: &E,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<(), BoxError>> + Send {
        (**self).handle(evt, cancel)
    }
}

impl<Q: Query, H: QueryHandler<Q>> QueryHandler<Q> for Arc<H> {
    fn handle(
        &self,
        query: &Q,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<Q::Output, BoxError>> + Send {
        (**self).handle(query, cancel)
    }
}

/// Object-safe handler producing `R`.
///
/// Commands and queries produce their declared output; events produce `()`.
pub trait DynHandler<R>: Send + Sync + 'static {
    /// Handle a message whose concrete type matches the handler's capability.
    fn handle_dyn<'a>(
        &'a self,
        message: &'a dyn Message,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<R, BoxError>>;
}

/// A boxed [`DynHandler`], the form registries resolve handlers to.
pub type BoxHandler<R> = Box<dyn DynHandler<R>>;

/// The registry handed a message of the wrong type to an erased handler.
#[derive(Debug, thiserror::Error)]
#[error("handler for `{expected}` received `{found}`")]
pub struct MessageMismatch {
    /// The type the handler was registered for.
    pub expected: &'static str,
    /// The type it received.
    pub found: &'static str,
}

fn mismatch<T, R>(message: &dyn Message) -> BoxFuture<'static, Result<R, BoxError>>
where
    R: Send + 'static,
{
    let err = MessageMismatch {
        expected: std::any::type_name::<T>(),
        found: message.type_name(),
    };
    futures::future::ready(Err(Box::new(err) as BoxError)).boxed()
}

struct Erased<M, H> {
    handler: H,
    _message: PhantomData<fn() -> M>,
}

impl<M, H> Erased<M, H> {
    fn new(handler: H) -> Self {
        Self {
            handler,
            _message: PhantomData,
        }
    }
}

impl<C: Command, H: CommandHandler<C>> DynHandler<C::Output> for Erased<C, H> {
    fn handle_dyn<'a>(
        &'a self,
        message: &'a dyn Message,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<C::Output, BoxError>> {
        match message.as_any().downcast_ref::<C>() {
            Some(cmd) => self.handler.handle(cmd, cancel).boxed(),
            None => mismatch::<C, C::Output>(message),
        }
    }
}

struct ErasedEvent<E, H>(Erased<E, H>);

impl<E: Event, H: EventHandler<E>> DynHandler<()> for ErasedEvent<E, H> {
    fn handle_dyn<'a>(
        &'a self,
        message: &'a dyn Message,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<(), BoxError>> {
        match message.as_any().downcast_ref::<E>() {
            Some(evt) => self.0.handler.handle(evt, cancel).boxed(),
            None => mismatch::<E, ()>(message),
        }
    }
}

struct ErasedQuery<Q, H>(Erased<Q, H>);

impl<Q: Query, H: QueryHandler<Q>> DynHandler<Q::Output> for ErasedQuery<Q, H> {
    fn handle_dyn<'a>(
        &'a self,
        message: &'a dyn Message,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<Q::Output, BoxError>> {
        match message.as_any().downcast_ref::<Q>() {
            Some(query) => self.0.handler.handle(query, cancel).boxed(),
            None => mismatch::<Q, Q::Output>(message),
        }
    }
}

/// Erase a command handler.
pub fn erase_command<C: Command, H: CommandHandler<C>>(handler: H) -> BoxHandler<C::Output> {
    Box::new(Erased::<C, H>::new(handler))
}

/// Erase an event handler.
pub fn erase_event<E: Event, H: EventHandler<E>>(handler: H) -> BoxHandler<()> {
    Box::new(ErasedEvent(Erased::<E, H>::new(handler)))
}

/// Erase a query handler.
pub fn erase_query<Q: Query, H: QueryHandler<Q>>(handler: H) -> BoxHandler<Q::Output> {
    Box::new(ErasedQuery(Erased::<Q, H>::new(handler)))
}
