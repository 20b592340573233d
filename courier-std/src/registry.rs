//! Builder-based handler registry.
//!
//! Register handlers and filters on a [`RegistryBuilder`], then call
//! `.build()` to get an immutable, thread-safe [`Registry`].
//!
//! # Lifetimes
//!
//! - `command`, `event`, `query` and the filter methods register a
//!   singleton: one instance shared by every resolution.
//! - `command_with`, `event_with` and `query_with` register a factory that
//!   builds a fresh handler on every resolution.
//!
//! # Example
//! ```ignore
//! let registry = RegistryBuilder::new()
//!     .command::<RegisterUser, _>(RegisterUserHandler::new(store.clone()))
//!     .event::<UserCreated, _>(SendWelcomeMail)
//!     .filter_with_meta(LoggingFilter::new(), RegistrationMeta::new().with_priority(-10))
//!     .build()?;
//! ```

use courier_core::{
    BoxErrorFilter, BoxPostHandleFilter, BoxPreHandleFilter, CapabilityKey, Command,
    CommandHandler, ErrorFilter, Event, EventHandler, HandlerRegistry, PostHandleFilter,
    PreHandleFilter, Query, QueryHandler, Resolved, Role, erase_command, erase_event,
    erase_query,
};
use std::{
    collections::HashMap,
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};
use thiserror::Error;

/// A handle for toggling a registration at runtime.
///
/// Disabled registrations are skipped by resolution until enabled again.
#[derive(Debug, Clone)]
pub struct EnabledHandle(Arc<AtomicBool>);

impl EnabledHandle {
    /// Create a handle with the given initial state.
    pub fn new(enabled: bool) -> Self {
        Self(Arc::new(AtomicBool::new(enabled)))
    }

    /// Whether the registration is currently enabled.
    pub fn is_enabled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Enable the registration.
    pub fn enable(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Disable the registration.
    pub fn disable(&self) {
        self.0.store(false, Ordering::Release);
    }

    /// Flip the state, returning the new one.
    pub fn toggle(&self) -> bool {
        !self.0.fetch_xor(true, Ordering::AcqRel)
    }
}

impl Default for EnabledHandle {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Metadata attached to a registration.
#[derive(Debug, Clone, Default)]
pub struct RegistrationMeta {
    /// Priority (lower = resolved first). Default is 0.
    pub priority: i32,
    enabled: EnabledHandle,
}

impl RegistrationMeta {
    /// Default metadata: priority 0, enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Set the initial enabled state.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = EnabledHandle::new(enabled);
        self
    }

    /// A handle for toggling the registration after the registry is built.
    pub fn enabled_handle(&self) -> EnabledHandle {
        self.enabled.clone()
    }

    /// Whether the registration is currently enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled.is_enabled()
    }
}

/// Errors raised when building a [`Registry`].
#[derive(Error, Debug)]
pub enum RegistryError {
    /// A command or query capability was registered more than once.
    #[error("more than one handler registered for {0}")]
    DuplicateHandler(CapabilityKey),
}

type Factory = Arc<dyn Fn() -> Resolved + Send + Sync>;

struct Entry {
    factory: Factory,
    meta: RegistrationMeta,
}

// ============================================================================
// RegistryBuilder - for constructing registries
// ============================================================================

/// Builder for constructing a [`Registry`].
#[derive(Default)]
pub struct RegistryBuilder {
    entries: HashMap<CapabilityKey, Vec<Entry>>,
}

impl RegistryBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, key: CapabilityKey, factory: Factory, meta: RegistrationMeta) -> Self {
        self.entries
            .entry(key)
            .or_default()
            .push(Entry { factory, meta });
        self
    }

    /// Register the singleton handler of command `C`.
    pub fn command<C: Command, H: CommandHandler<C>>(self, handler: H) -> Self {
        let shared = Arc::new(handler);
        self.command_with::<C, _, _>(move || Arc::clone(&shared))
    }

    /// Register a factory building the handler of command `C` on every resolve.
    pub fn command_with<C, H, F>(self, factory: F) -> Self
    where
        C: Command,
        H: CommandHandler<C>,
        F: Fn() -> H + Send + Sync + 'static,
    {
        self.push(
            CapabilityKey::command::<C>(),
            Arc::new(move || Resolved::new(erase_command::<C, _>(factory()))),
            RegistrationMeta::new(),
        )
    }

    /// Register a singleton handler of event `E`.
    pub fn event<E: Event, H: EventHandler<E>>(self, handler: H) -> Self {
        self.event_with_meta::<E, _>(handler, RegistrationMeta::new())
    }

    /// Register a singleton handler of event `E` with metadata.
    pub fn event_with_meta<E: Event, H: EventHandler<E>>(
        self,
        handler: H,
        meta: RegistrationMeta,
    ) -> Self {
        let shared = Arc::new(handler);
        self.push(
            CapabilityKey::event::<E>(),
            Arc::new(move || Resolved::new(erase_event::<E, _>(Arc::clone(&shared)))),
            meta,
        )
    }

    /// Register a factory building a handler of event `E` on every resolve.
    pub fn event_with<E, H, F>(self, factory: F) -> Self
    where
        E: Event,
        H: EventHandler<E>,
        F: Fn() -> H + Send + Sync + 'static,
    {
        self.push(
            CapabilityKey::event::<E>(),
            Arc::new(move || Resolved::new(erase_event::<E, _>(factory()))),
            RegistrationMeta::new(),
        )
    }

    /// Register the singleton handler of query `Q`.
    pub fn query<Q: Query, H: QueryHandler<Q>>(self, handler: H) -> Self {
        let shared = Arc::new(handler);
        self.query_with::<Q, _, _>(move || Arc::clone(&shared))
    }

    /// Register a factory building the handler of query `Q` on every resolve.
    pub fn query_with<Q, H, F>(self, factory: F) -> Self
    where
        Q: Query,
        H: QueryHandler<Q>,
        F: Fn() -> H + Send + Sync + 'static,
    {
        self.push(
            CapabilityKey::query::<Q>(),
            Arc::new(move || Resolved::new(erase_query::<Q, _>(factory()))),
            RegistrationMeta::new(),
        )
    }

    /// Register a pre-handling filter.
    pub fn pre_filter<F: PreHandleFilter>(self, filter: F) -> Self {
        self.pre_filter_with_meta(filter, RegistrationMeta::new())
    }

    /// Register a pre-handling filter with metadata.
    pub fn pre_filter_with_meta<F: PreHandleFilter>(self, filter: F, meta: RegistrationMeta) -> Self {
        self.pre_shared(Arc::new(filter), meta)
    }

    /// Register a post-handling filter.
    pub fn post_filter<F: PostHandleFilter>(self, filter: F) -> Self {
        self.post_filter_with_meta(filter, RegistrationMeta::new())
    }

    /// Register a post-handling filter with metadata.
    pub fn post_filter_with_meta<F: PostHandleFilter>(
        self,
        filter: F,
        meta: RegistrationMeta,
    ) -> Self {
        self.post_shared(Arc::new(filter), meta)
    }

    /// Register an error filter.
    pub fn error_filter<F: ErrorFilter>(self, filter: F) -> Self {
        self.error_filter_with_meta(filter, RegistrationMeta::new())
    }

    /// Register an error filter with metadata.
    pub fn error_filter_with_meta<F: ErrorFilter>(self, filter: F, meta: RegistrationMeta) -> Self {
        self.error_shared(Arc::new(filter), meta)
    }

    /// Register one instance in all three filter roles.
    pub fn filter<F>(self, filter: F) -> Self
    where
        F: PreHandleFilter + PostHandleFilter + ErrorFilter,
    {
        self.filter_with_meta(filter, RegistrationMeta::new())
    }

    /// Register one instance in all three filter roles, sharing `meta`.
    ///
    /// The enabled handle of `meta` toggles all three roles at once.
    pub fn filter_with_meta<F>(self, filter: F, meta: RegistrationMeta) -> Self
    where
        F: PreHandleFilter + PostHandleFilter + ErrorFilter,
    {
        let shared = Arc::new(filter);
        self.pre_shared(Arc::clone(&shared), meta.clone())
            .post_shared(Arc::clone(&shared), meta.clone())
            .error_shared(shared, meta)
    }

    fn pre_shared<F: PreHandleFilter>(self, shared: Arc<F>, meta: RegistrationMeta) -> Self {
        self.push(
            CapabilityKey::filter(Role::PreFilter),
            Arc::new(move || {
                Resolved::new(Box::new(Arc::clone(&shared)) as BoxPreHandleFilter)
            }),
            meta,
        )
    }

    fn post_shared<F: PostHandleFilter>(self, shared: Arc<F>, meta: RegistrationMeta) -> Self {
        self.push(
            CapabilityKey::filter(Role::PostFilter),
            Arc::new(move || {
                Resolved::new(Box::new(Arc::clone(&shared)) as BoxPostHandleFilter)
            }),
            meta,
        )
    }

    fn error_shared<F: ErrorFilter>(self, shared: Arc<F>, meta: RegistrationMeta) -> Self {
        self.push(
            CapabilityKey::filter(Role::ErrorFilter),
            Arc::new(move || Resolved::new(Box::new(Arc::clone(&shared)) as BoxErrorFilter)),
            meta,
        )
    }

    /// Build the immutable [`Registry`].
    ///
    /// Sorts every capability's entries by priority (ties keep registration
    /// order) and rejects duplicate command or query handlers.
    pub fn build(mut self) -> Result<Registry, RegistryError> {
        for (key, entries) in &mut self.entries {
            if matches!(key.role(), Role::Command | Role::Query) && entries.len() > 1 {
                return Err(RegistryError::DuplicateHandler(*key));
            }
            entries.sort_by_key(|e| e.meta.priority);
        }
        Ok(Registry {
            entries: self.entries,
        })
    }

    /// Number of registrations.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Whether nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for RegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryBuilder")
            .field("len", &self.len())
            .finish()
    }
}

// ============================================================================
// Registry - immutable, thread-safe handler storage
// ============================================================================

/// An immutable, thread-safe registry of handlers and filters.
///
/// Created by [`RegistryBuilder::build`]. Share it with `Arc` or hand it to
/// the mediator directly.
pub struct Registry {
    entries: HashMap<CapabilityKey, Vec<Entry>>,
}

impl Registry {
    /// Start building a registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    fn enabled(&self, key: &CapabilityKey) -> impl Iterator<Item = &Entry> {
        self.entries
            .get(key)
            .into_iter()
            .flatten()
            .filter(|e| e.meta.is_enabled())
    }

    /// Whether an enabled registration exists for `key`.
    pub fn contains(&self, key: &CapabilityKey) -> bool {
        self.enabled(key).next().is_some()
    }

    /// Number of registrations, enabled or not.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl HandlerRegistry for Registry {
    fn resolve_one(&self, key: &CapabilityKey) -> Option<Resolved> {
        self.enabled(key).next().map(|e| (e.factory)())
    }

    fn resolve_all(&self, key: &CapabilityKey) -> Vec<Resolved> {
        self.enabled(key).map(|e| (e.factory)()).collect()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry").field("len", &self.len()).finish()
    }
}
