mod common;

use common::{FailingEventHandler, InvalidOperation, UserCreated};
use courier::{
    CancellationToken, ConcurrentDelivery, Error, Event, Mediator, RegistrationMeta,
    RegistryBuilder,
    testing::{CountingHandler, Journal, RecordingFilter},
    uuid::Uuid,
};
use std::sync::Arc;

fn created() -> UserCreated {
    UserCreated {
        user_id: Uuid::new_v4(),
    }
}

#[tokio::test]
async fn test_second_handler_failure_halts_broadcast() {
    let journal = Journal::new();
    let first = CountingHandler::new("first", journal.clone());
    let third = CountingHandler::new("third", journal.clone());
    let observer = RecordingFilter::new("observer", journal.clone());
    let registry = RegistryBuilder::new()
        .error_filter(observer.clone())
        .event::<UserCreated, _>(first.clone())
        .event::<UserCreated, _>(FailingEventHandler("mail server down"))
        .event::<UserCreated, _>(third.clone())
        .build()
        .unwrap();
    let mediator = Mediator::new(registry);

    let err = mediator
        .broadcast(&created(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(
        err.downcast_ref::<InvalidOperation>(),
        Some(&InvalidOperation("mail server down".into()))
    );
    assert_eq!(first.count(), 1);
    assert_eq!(third.count(), 0);
    assert_eq!(journal.entries(), ["first", "observer.error"]);
    assert_eq!(observer.observed_errors(), ["mail server down"]);
}

#[tokio::test]
async fn test_handlers_run_in_registry_order() {
    let journal = Journal::new();
    let registry = RegistryBuilder::new()
        .event::<UserCreated, _>(CountingHandler::new("a", journal.clone()))
        .event::<UserCreated, _>(CountingHandler::new("b", journal.clone()))
        .event_with_meta::<UserCreated, _>(
            CountingHandler::new("urgent", journal.clone()),
            RegistrationMeta::new().with_priority(-1),
        )
        .event::<UserCreated, _>(CountingHandler::new("c", journal.clone()))
        .build()
        .unwrap();
    let mediator = Mediator::new(registry);

    mediator
        .broadcast(&created(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(journal.entries(), ["urgent", "a", "b", "c"]);
}

#[tokio::test]
async fn test_broadcast_without_handlers_succeeds() {
    let journal = Journal::new();
    let registry = RegistryBuilder::new()
        .filter(RecordingFilter::new("audit", journal.clone()))
        .build()
        .unwrap();
    let mediator = Mediator::new(registry);

    mediator
        .broadcast(&created(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(journal.entries(), ["audit.pre", "audit.post"]);
}

#[tokio::test]
async fn test_broadcast_through_marker() {
    let handler = CountingHandler::new("seen", Journal::new());
    let registry = RegistryBuilder::new()
        .event::<UserCreated, _>(handler.clone())
        .build()
        .unwrap();
    let mediator = Mediator::new(registry);

    let evt: Arc<dyn Event> = Arc::new(created());
    mediator
        .broadcast(&*evt, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(handler.count(), 1);
}

#[tokio::test]
async fn test_disabled_handler_is_skipped() {
    let skipped = CountingHandler::new("skipped", Journal::new());
    let meta = RegistrationMeta::new();
    let toggle = meta.enabled_handle();
    let registry = RegistryBuilder::new()
        .event_with_meta::<UserCreated, _>(skipped.clone(), meta)
        .build()
        .unwrap();
    let mediator = Mediator::new(registry);
    let cancel = CancellationToken::new();

    toggle.disable();
    mediator.broadcast(&created(), &cancel).await.unwrap();
    assert_eq!(skipped.count(), 0);

    toggle.enable();
    mediator.broadcast(&created(), &cancel).await.unwrap();
    assert_eq!(skipped.count(), 1);
}

#[tokio::test]
async fn test_transient_handlers_are_built_per_broadcast() {
    let journal = Journal::new();
    let factory_journal = journal.clone();
    let registry = RegistryBuilder::new()
        .event_with::<UserCreated, _, _>(move || {
            factory_journal.record("built");
            CountingHandler::new("handled", factory_journal.clone())
        })
        .build()
        .unwrap();
    let mediator = Mediator::new(registry);
    let cancel = CancellationToken::new();

    mediator.broadcast(&created(), &cancel).await.unwrap();
    mediator.broadcast(&created(), &cancel).await.unwrap();

    assert_eq!(journal.entries(), ["built", "handled", "built", "handled"]);
}

#[tokio::test]
async fn test_concurrent_delivery_aggregates_failures() {
    let last = CountingHandler::new("last", Journal::new());
    let registry = RegistryBuilder::new()
        .event::<UserCreated, _>(FailingEventHandler("first"))
        .event::<UserCreated, _>(FailingEventHandler("second"))
        .event::<UserCreated, _>(last.clone())
        .build()
        .unwrap();
    let mediator = Mediator::builder()
        .registry(registry)
        .delivery(ConcurrentDelivery)
        .build()
        .unwrap();

    let err = mediator
        .broadcast(&created(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(last.count(), 1);
    let failures = match err {
        Error::Aggregate(failures) => failures,
        other => panic!("expected an aggregate failure, got {other:?}"),
    };
    let messages: Vec<String> = failures.iter().map(ToString::to_string).collect();
    assert_eq!(messages, ["first", "second"]);
}

#[tokio::test]
async fn test_typed_broadcaster() {
    let handler = CountingHandler::new("seen", Journal::new());
    let registry = RegistryBuilder::new()
        .event::<UserCreated, _>(handler.clone())
        .build()
        .unwrap();
    let mediator = Mediator::new(registry);

    let broadcaster = mediator.broadcaster::<UserCreated>();
    let cancel = CancellationToken::new();
    broadcaster.broadcast(&created(), &cancel).await.unwrap();
    broadcaster.clone().broadcast(&created(), &cancel).await.unwrap();

    assert_eq!(handler.count(), 2);
}
