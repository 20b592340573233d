//! Blocking dispatch for callers that cannot await.
//!
//! Each call runs the async path to completion with a fresh, never-canceled
//! token on a private current-thread runtime. Called from inside a Tokio
//! runtime, the work moves to a scoped helper thread so the caller's runtime
//! is never re-entered. The calling thread is blocked either way.

use crate::mediator::Mediator;
use courier_core::{CancellationToken, Command, Error, Event, Query};
use courier_std::DeliveryStrategy;
use std::{future::Future, io, panic, thread};
use tokio::runtime::{Builder, Handle, Runtime};

impl<D: DeliveryStrategy> Mediator<D> {
    /// Blocking form of [`Mediator::send`].
    ///
    /// Failures are returned unchanged. A panic in the dispatch resumes on
    /// the calling thread.
    pub fn send_blocking<C>(&self, cmd: &C) -> Result<C::Output, Error>
    where
        C: Command + ?Sized,
    {
        let cancel = CancellationToken::new();
        block_on(self.send(cmd, &cancel))
    }

    /// Blocking form of [`Mediator::broadcast`].
    pub fn broadcast_blocking<E>(&self, evt: &E) -> Result<(), Error>
    where
        E: Event + ?Sized,
    {
        let cancel = CancellationToken::new();
        block_on(self.broadcast(evt, &cancel))
    }

    /// Blocking form of [`Mediator::fetch`].
    pub fn fetch_blocking<Q>(&self, query: &Q) -> Result<Q::Output, Error>
    where
        Q: Query + ?Sized,
    {
        let cancel = CancellationToken::new();
        block_on(self.fetch(query, &cancel))
    }
}

fn runtime() -> io::Result<Runtime> {
    Builder::new_current_thread().enable_all().build()
}

fn block_on<T, F>(dispatch: F) -> Result<T, Error>
where
    T: Send,
    F: Future<Output = Result<T, Error>> + Send,
{
    if Handle::try_current().is_err() {
        return runtime()?.block_on(dispatch);
    }

    thread::scope(|scope| {
        scope
            .spawn(move || -> Result<T, Error> { runtime()?.block_on(dispatch) })
            .join()
            .unwrap_or_else(|payload| panic::resume_unwind(payload))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_on_outside_runtime() {
        let value = block_on(async { Ok::<_, Error>(Handle::try_current().is_ok()) }).unwrap();
        assert!(value);
    }

    #[tokio::test]
    async fn test_block_on_inside_runtime_uses_helper_thread() {
        let caller = thread::current().id();
        let seen = block_on(async move { Ok(thread::current().id()) }).unwrap();
        assert_ne!(seen, caller);
    }

    #[test]
    fn test_failure_is_unchanged() {
        let err = block_on(async { Err::<(), _>(Error::MissingArgument("query")) }).unwrap_err();
        assert!(matches!(err, Error::MissingArgument("query")));
    }

    #[test]
    #[should_panic(expected = "handler exploded")]
    fn test_panic_resumes_on_caller() {
        let rt = runtime().unwrap();
        let _guard = rt.enter();
        let explode = true;
        let _ = block_on(async move {
            if explode {
                panic!("handler exploded");
            }
            Ok::<(), Error>(())
        });
    }
}
