use super::traits::DeliveryStrategy;
use courier_core::{BoxHandler, CancellationToken, Error, Message};

/// A sequential delivery strategy.
///
/// Runs handlers one by one in registry order. The first failure stops
/// delivery; later handlers do not run.
#[derive(Debug, Default, Clone, Copy)]
pub struct SequentialDelivery;

impl DeliveryStrategy for SequentialDelivery {
    async fn deliver(
        &self,
        event: &dyn Message,
        handlers: Vec<BoxHandler<()>>,
        cancel: &CancellationToken,
    ) -> Result<(), Error> {
        for handler in &handlers {
            handler
                .handle_dyn(event, cancel)
                .await
                .map_err(Error::from_handler)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CountingHandler, Journal};
    use courier_core::{BoxError, Event, EventHandler, erase_event};

    struct Shipped;
    impl Message for Shipped {}
    impl Event for Shipped {}

    struct Broken;

    impl EventHandler<Shipped> for Broken {
        async fn handle(&self, _evt: &Shipped, _cancel: &CancellationToken) -> Result<(), BoxError> {
            Err("warehouse offline".into())
        }
    }

    #[tokio::test]
    async fn test_halts_on_first_failure() {
        let journal = Journal::new();
        let first = CountingHandler::new("first", journal.clone());
        let last = CountingHandler::new("last", journal.clone());
        let handlers = vec![
            erase_event::<Shipped, _>(first.clone()),
            erase_event::<Shipped, _>(Broken),
            erase_event::<Shipped, _>(last.clone()),
        ];

        let err = SequentialDelivery
            .deliver(&Shipped, handlers, &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "warehouse offline");
        assert_eq!(first.count(), 1);
        assert_eq!(last.count(), 0);
        assert_eq!(journal.entries(), ["first"]);
    }

    #[tokio::test]
    async fn test_no_handlers_is_ok() {
        let result = SequentialDelivery
            .deliver(&Shipped, Vec::new(), &CancellationToken::new())
            .await;
        assert!(result.is_ok());
    }
}
