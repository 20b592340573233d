use courier_core::{BoxHandler, CancellationToken, Error, Message};
use std::future::Future;

/// Strategy for delivering an event to its resolved handlers.
///
/// Handlers arrive in registry order. Failures are classified with
/// [`Error::from_handler`] so cancellation surfaces as [`Error::Canceled`].
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a delivery strategy",
    label = "missing `DeliveryStrategy` implementation",
    note = "Use `SequentialDelivery` or `ConcurrentDelivery`, or implement `deliver`."
)]
pub trait DeliveryStrategy: Send + Sync + 'static {
    /// Deliver `event` to `handlers`.
    fn deliver(
        &self,
        event: &dyn Message,
        handlers: Vec<BoxHandler<()>>,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<(), Error>> + Send;
}
