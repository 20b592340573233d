use super::traits::DeliveryStrategy;
use courier_core::{BoxHandler, CancellationToken, Error, Message};
use futures::future::join_all;

/// A fan-out delivery strategy.
///
/// Polls every handler concurrently on the caller's task; nothing is
/// spawned. Every handler runs to completion. A single failure is returned
/// as is; several are collected into [`Error::Aggregate`] in registry order.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConcurrentDelivery;

impl DeliveryStrategy for ConcurrentDelivery {
    async fn deliver(
        &self,
        event: &dyn Message,
        handlers: Vec<BoxHandler<()>>,
        cancel: &CancellationToken,
    ) -> Result<(), Error> {
        let results = join_all(handlers.iter().map(|h| h.handle_dyn(event, cancel))).await;

        let mut failures: Vec<Error> = results
            .into_iter()
            .filter_map(Result::err)
            .map(Error::from_handler)
            .collect();

        match failures.len() {
            0 => Ok(()),
            1 => Err(failures.remove(0)),
            _ => Err(Error::Aggregate(failures)),
        }
    }
}
