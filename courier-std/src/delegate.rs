//! Delegate-backed handlers.
//!
//! Present a plain async function as a handler, so trivial commands, events
//! and queries do not need a handler type of their own.
//!
//! The function receives the message and the cancellation token by reference
//! and returns a boxed future borrowing them:
//!
//! ```rust,ignore
//! use futures::FutureExt;
//!
//! let handler = delegate::command::<RegisterUser, _>(|cmd, cancel| {
//!     async move {
//!         cancel.ensure_active()?;
//!         Ok(Uuid::new_v4())
//!     }
//!     .boxed()
//! });
//! ```
//!
//! Failures raised by the function propagate unchanged.

use courier_core::{
    BoxError, CancellationToken, Command, CommandHandler, Event, EventHandler, Query,
    QueryHandler,
};
use futures::future::BoxFuture;
use std::marker::PhantomData;

/// A [`CommandHandler`] backed by a function. See [`command`].
pub struct DelegateCommandHandler<C, F> {
    handler: F,
    _command: PhantomData<fn() -> C>,
}

/// An [`EventHandler`] backed by a function. See [`event`].
pub struct DelegateEventHandler<E, F> {
    handler: F,
    _event: PhantomData<fn() -> E>,
}

/// A [`QueryHandler`] backed by a function. See [`query`].
pub struct DelegateQueryHandler<Q, F> {
    handler: F,
    _query: PhantomData<fn() -> Q>,
}

/// Wrap a function as the handler of command `C`.
pub fn command<C, F>(handler: F) -> DelegateCommandHandler<C, F>
where
    C: Command,
    F: for<'a> Fn(&'a C, &'a CancellationToken) -> BoxFuture<'a, Result<C::Output, BoxError>>
        + Send
        + Sync
        + 'static,
{
    DelegateCommandHandler {
        handler,
        _command: PhantomData,
    }
}

/// Wrap a function as a handler of event `E`.
pub fn event<E, F>(handler: F) -> DelegateEventHandler<E, F>
where
    E: Event,
    F: for<'a> Fn(&'a E, &'a CancellationToken) -> BoxFuture<'a, Result<(), BoxError>>
        + Send
        + Sync
        + 'static,
{
    DelegateEventHandler {
        handler,
        _event: PhantomData,
    }
}

/// Wrap a function as the handler of query `Q`.
pub fn query<Q, F>(handler: F) -> DelegateQueryHandler<Q, F>
where
    Q: Query,
    F: for<'a> Fn(&'a Q, &'a CancellationToken) -> BoxFuture<'a, Result<Q::Output, BoxError>>
        + Send
        + Sync
        + 'static,
{
    DelegateQueryHandler {
        handler,
        _query: PhantomData,
    }
}

impl<C, F> CommandHandler<C> for DelegateCommandHandler<C, F>
where
    C: Command,
    F: for<'a> Fn(&'a C, &'a CancellationToken) -> BoxFuture<'a, Result<C::Output, BoxError>>
        + Send
        + Sync
        + 'static,
{
    async fn handle(&self, cmd: &C, cancel: &CancellationToken) -> Result<C::Output, BoxError> {
        (self.handler)(cmd, cancel).await
    }
}

impl<E, F> EventHandler<E> for DelegateEventHandler<E, F>
where
    E: Event,
    F: for<'a> Fn(&'a E, &'a CancellationToken) -> BoxFuture<'a, Result<(), BoxError>>
        + Send
        + Sync
        + 'static,
{
    async fn handle(&self, evt: &E, cancel: &CancellationToken) -> Result<(), BoxError> {
        (self.handler)(evt, cancel).await
    }
}

impl<Q, F> QueryHandler<Q> for DelegateQueryHandler<Q, F>
where
    Q: Query,
    F: for<'a> Fn(&'a Q, &'a CancellationToken) -> BoxFuture<'a, Result<Q::Output, BoxError>>
        + Send
        + Sync
        + 'static,
{
    async fn handle(&self, query: &Q, cancel: &CancellationToken) -> Result<Q::Output, BoxError> {
        (self.handler)(query, cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::{CancellationExt, Canceled, Message};
    use futures::FutureExt;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    struct Add(u32, u32);
    impl Message for Add {}
    impl Command for Add {
        type Output = u32;
    }

    struct Ticked;
    impl Message for Ticked {}
    impl Event for Ticked {}

    struct Answer;
    impl Message for Answer {}
    impl Query for Answer {
        type Output = String;
    }

    #[tokio::test]
    async fn test_command_delegate_forwards() {
        let handler = command::<Add, _>(|cmd, _cancel| async move { Ok(cmd.0 + cmd.1) }.boxed());
        let cancel = CancellationToken::new();

        assert_eq!(handler.handle(&Add(2, 3), &cancel).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_event_delegate_counts() {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        let handler = event::<Ticked, _>(move |_evt, _cancel| {
            let seen = seen.clone();
            async move {
                seen.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            .boxed()
        });
        let cancel = CancellationToken::new();

        handler.handle(&Ticked, &cancel).await.unwrap();
        handler.handle(&Ticked, &cancel).await.unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_delegate_failure_propagates_unchanged() {
        let handler = query::<Answer, _>(|_query, cancel| {
            async move {
                cancel.ensure_active()?;
                Ok::<_, BoxError>("42".to_string())
            }
            .boxed()
        });
        let cancel = CancellationToken::new();
        assert_eq!(handler.handle(&Answer, &cancel).await.unwrap(), "42");

        cancel.cancel();
        let err = handler.handle(&Answer, &cancel).await.unwrap_err();
        assert!(err.is::<Canceled>());
    }
}
