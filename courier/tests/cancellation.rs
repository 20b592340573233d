mod common;

use common::{AwaitCancellation, RegisterUser, RegisterUserHandler, UserStore, G1};
use courier::{
    BoxError, CancellationExt, CancellationToken, Canceled, Error, Mediator, Message,
    PreHandleFilter, RegistryBuilder,
    testing::{CountingHandler, Journal, RecordingFilter, token_addr},
};
use std::time::Duration;

/// Fires the token once it has run, as if the caller gave up mid-dispatch.
struct CancelAfter(Journal);

impl PreHandleFilter for CancelAfter {
    async fn on_command(&self, _cmd: &dyn Message, cancel: &CancellationToken) -> Result<(), BoxError> {
        self.0.record("cancel");
        cancel.cancel();
        Ok(())
    }
}

/// Refuses to start once the token fired.
struct Gate;

impl PreHandleFilter for Gate {
    async fn on_command(&self, _cmd: &dyn Message, cancel: &CancellationToken) -> Result<(), BoxError> {
        cancel.ensure_active()?;
        Ok(())
    }
}

#[tokio::test]
async fn test_cancellation_mid_dispatch() {
    let store = UserStore::new();
    let journal = Journal::new();
    let observer = RecordingFilter::new("observer", journal.clone());
    let registry = RegistryBuilder::new()
        .pre_filter(RecordingFilter::new("first", journal.clone()))
        .pre_filter(CancelAfter(journal.clone()))
        .error_filter(observer.clone())
        .command::<RegisterUser, _>(RegisterUserHandler {
            store: store.clone(),
            next_id: G1,
        })
        .build()
        .unwrap();
    let mediator = Mediator::new(registry);
    let cancel = CancellationToken::new();

    let err = mediator
        .send(&RegisterUser::new("a@b", "x"), &cancel)
        .await
        .unwrap_err();

    assert!(err.is_canceled());
    assert_eq!(journal.entries(), ["first.pre", "cancel", "observer.error"]);
    assert_eq!(observer.observed_errors(), ["dispatch was canceled"]);
    assert_eq!(store.len(), 0);
}

#[tokio::test]
async fn test_same_token_reaches_every_step() {
    let journal = Journal::new();
    let filter = RecordingFilter::new("audit", journal.clone());
    let handler = CountingHandler::new("handler", journal.clone());
    let registry = RegistryBuilder::new()
        .filter(filter.clone())
        .command::<RegisterUser, _>(handler.clone())
        .build()
        .unwrap();
    let mediator = Mediator::new(registry);
    let cancel = CancellationToken::new();

    mediator
        .send(&RegisterUser::new("a@b", "x"), &cancel)
        .await
        .unwrap();

    let expected = token_addr(&cancel);
    assert_eq!(filter.tokens(), [expected, expected]);
    assert_eq!(handler.tokens(), [expected]);
}

#[tokio::test]
async fn test_cancellation_while_handler_waits() {
    let registry = RegistryBuilder::new()
        .command::<RegisterUser, _>(AwaitCancellation)
        .build()
        .unwrap();
    let mediator = Mediator::new(registry);
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        trigger.cancel();
    });

    let err = mediator
        .send(&RegisterUser::new("a@b", "x"), &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Canceled));
}

#[tokio::test]
async fn test_canceled_filter_is_not_a_filter_failure() {
    let handler = CountingHandler::new("handler", Journal::new());
    let registry = RegistryBuilder::new()
        .pre_filter(Gate)
        .command::<RegisterUser, _>(handler.clone())
        .build()
        .unwrap();
    let mediator = Mediator::new(registry);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = mediator
        .send(&RegisterUser::new("a@b", "x"), &cancel)
        .await
        .unwrap_err();

    assert!(err.is_canceled());
    assert_eq!(handler.count(), 0);
}

#[tokio::test]
async fn test_guard_completes_before_cancellation() {
    let cancel = CancellationToken::new();
    assert_eq!(cancel.guard(async { 5 }).await, Ok(5));

    cancel.cancel();
    assert_eq!(cancel.ensure_active(), Err(Canceled));
}
