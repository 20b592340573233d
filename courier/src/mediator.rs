//! The mediator: routes commands, events and queries to their handlers.

use crate::pipeline::{Pipeline, resolve_all};
use courier_core::{
    BoxHandler, CancellationToken, CapabilityKey, Command, Error, Event, HandlerRegistry,
    MessageKind, MessageType, Query,
};
use courier_std::{DeliveryStrategy, SequentialDelivery};
use std::{any::Any, fmt, marker::PhantomData, sync::Arc};

/// Dispatches messages to the handlers a registry resolves for them.
///
/// The capability is always chosen from the runtime type of the message, so
/// a command held as `&dyn Command<Output = R>` reaches the handler of its
/// concrete type. Every dispatch runs inside the filter pipeline.
///
/// The mediator owns no mutable state and is cheap to clone. The event
/// delivery strategy is a type parameter; see [`SequentialDelivery`] (the
/// default) and [`ConcurrentDelivery`](courier_std::ConcurrentDelivery).
///
/// # Example
///
/// ```rust,ignore
/// let registry = RegistryBuilder::new()
///     .command::<RegisterUser, _>(RegisterUserHandler::new(store))
///     .build()?;
/// let mediator = Mediator::new(registry);
///
/// let id = mediator.send(&RegisterUser::new("a@b", "x"), &cancel).await?;
/// ```
pub struct Mediator<D = SequentialDelivery> {
    registry: Arc<dyn HandlerRegistry>,
    delivery: Arc<D>,
}

impl Mediator {
    /// Create a mediator over `registry` with sequential event delivery.
    pub fn new(registry: impl HandlerRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            delivery: Arc::new(SequentialDelivery),
        }
    }

    /// Start configuring a mediator.
    pub fn builder() -> MediatorBuilder {
        MediatorBuilder::new()
    }
}

impl<D: DeliveryStrategy> Mediator<D> {
    /// Dispatch a command to its single handler.
    ///
    /// # Errors
    ///
    /// [`Error::HandlerNotFound`] when no handler is registered; otherwise
    /// whatever the pipeline surfaces.
    pub async fn send<C>(&self, cmd: &C, cancel: &CancellationToken) -> Result<C::Output, Error>
    where
        C: Command + ?Sized,
    {
        let message = cmd.as_message();
        let key = CapabilityKey::command_for::<C::Output>(MessageType::of_message(message));
        let handler: BoxHandler<C::Output> = self.resolve_one(key)?;

        Pipeline::new(&*self.registry, MessageKind::Command, message, cancel)?
            .run(async {
                handler
                    .handle_dyn(message, cancel)
                    .await
                    .map_err(Error::from_handler)
            })
            .await
    }

    /// Broadcast an event to every handler registered for it.
    ///
    /// Succeeds without doing anything but run the filters when no handler
    /// is registered.
    pub async fn broadcast<E>(&self, evt: &E, cancel: &CancellationToken) -> Result<(), Error>
    where
        E: Event + ?Sized,
    {
        let message = evt.as_message();
        let key = CapabilityKey::event_for(MessageType::of_message(message));
        let handlers: Vec<BoxHandler<()>> = resolve_all(&*self.registry, key)?;

        Pipeline::new(&*self.registry, MessageKind::Event, message, cancel)?
            .run(self.delivery.deliver(message, handlers, cancel))
            .await
    }

    /// Fetch the result of a query from its single handler.
    ///
    /// # Errors
    ///
    /// [`Error::HandlerNotFound`] when no handler is registered; otherwise
    /// whatever the pipeline surfaces.
    pub async fn fetch<Q>(&self, query: &Q, cancel: &CancellationToken) -> Result<Q::Output, Error>
    where
        Q: Query + ?Sized,
    {
        let message = query.as_message();
        let key = CapabilityKey::query_for::<Q::Output>(MessageType::of_message(message));
        let handler: BoxHandler<Q::Output> = self.resolve_one(key)?;

        Pipeline::new(&*self.registry, MessageKind::Query, message, cancel)?
            .run(async {
                handler
                    .handle_dyn(message, cancel)
                    .await
                    .map_err(Error::from_handler)
            })
            .await
    }

    /// A broadcaster bound to event type `E`.
    pub fn broadcaster<E: Event>(&self) -> Broadcaster<E, D> {
        Broadcaster {
            mediator: self.clone(),
            _event: PhantomData,
        }
    }

    /// The registry this mediator resolves from.
    pub fn registry(&self) -> &Arc<dyn HandlerRegistry> {
        &self.registry
    }

    fn resolve_one<T: Any>(&self, key: CapabilityKey) -> Result<T, Error> {
        self.registry
            .resolve_one(&key)
            .ok_or(Error::HandlerNotFound(key))?
            .downcast::<T>()
            .map_err(|_| Error::UnexpectedResolution(key))
    }
}

impl<D> Clone for Mediator<D> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            delivery: Arc::clone(&self.delivery),
        }
    }
}

impl<D: fmt::Debug> fmt::Debug for Mediator<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mediator")
            .field("delivery", &self.delivery)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// MediatorBuilder
// ============================================================================

/// Builder for a [`Mediator`].
///
/// # Example
///
/// ```rust,ignore
/// let mediator = Mediator::builder()
///     .registry(registry)
///     .delivery(ConcurrentDelivery)
///     .build()?;
/// ```
pub struct MediatorBuilder<D = SequentialDelivery> {
    registry: Option<Arc<dyn HandlerRegistry>>,
    delivery: D,
}

impl MediatorBuilder {
    /// Create a builder with no registry and sequential event delivery.
    pub fn new() -> Self {
        Self {
            registry: None,
            delivery: SequentialDelivery,
        }
    }
}

impl Default for MediatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: DeliveryStrategy> MediatorBuilder<D> {
    /// Set the registry.
    pub fn registry(mut self, registry: impl HandlerRegistry) -> Self {
        self.registry = Some(Arc::new(registry));
        self
    }

    /// Set a registry that is already shared.
    pub fn shared_registry(mut self, registry: Arc<dyn HandlerRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Set the event delivery strategy.
    pub fn delivery<S: DeliveryStrategy>(self, delivery: S) -> MediatorBuilder<S> {
        MediatorBuilder {
            registry: self.registry,
            delivery,
        }
    }

    /// Build the mediator.
    ///
    /// # Errors
    ///
    /// [`Error::MissingArgument`] when no registry was set.
    pub fn build(self) -> Result<Mediator<D>, Error> {
        let registry = self.registry.ok_or(Error::MissingArgument("registry"))?;
        Ok(Mediator {
            registry,
            delivery: Arc::new(self.delivery),
        })
    }
}

// ============================================================================
// Broadcaster
// ============================================================================

/// A handle for broadcasting one event type.
///
/// Created by [`Mediator::broadcaster`]. Hand it to code that should publish
/// `E` and nothing else.
pub struct Broadcaster<E, D = SequentialDelivery> {
    mediator: Mediator<D>,
    _event: PhantomData<fn(&E)>,
}

impl<E: Event, D: DeliveryStrategy> Broadcaster<E, D> {
    /// Broadcast `evt`; equivalent to [`Mediator::broadcast`].
    pub async fn broadcast(&self, evt: &E, cancel: &CancellationToken) -> Result<(), Error> {
        self.mediator.broadcast(evt, cancel).await
    }

    /// The mediator behind this broadcaster.
    pub fn mediator(&self) -> &Mediator<D> {
        &self.mediator
    }
}

impl<E, D> Clone for Broadcaster<E, D> {
    fn clone(&self) -> Self {
        Self {
            mediator: self.mediator.clone(),
            _event: PhantomData,
        }
    }
}

impl<E, D: fmt::Debug> fmt::Debug for Broadcaster<E, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Broadcaster")
            .field("event", &std::any::type_name::<E>())
            .field("mediator", &self.mediator)
            .finish()
    }
}
