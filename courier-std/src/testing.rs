//! Testing utilities for Courier.
//!
//! This module provides helpers for asserting what a dispatch did, and in
//! which order.
//!
//! # Features
//!
//! - [`Journal`]: A shared, ordered call log
//! - [`RecordingFilter`]: A filter in all three roles that writes to a journal
//! - [`CountingHandler`]: A handler of any message that counts its calls
//!
//! # Example
//!
//! ```rust,ignore
//! let journal = Journal::new();
//! let registry = RegistryBuilder::new()
//!     .filter(RecordingFilter::new("outer", journal.clone()))
//!     .command::<Ping, _>(CountingHandler::new("handler", journal.clone()))
//!     .build()?;
//!
//! mediator.send(&Ping, &cancel).await?;
//! assert_eq!(journal.entries(), ["outer.pre", "handler", "outer.post"]);
//! ```

use courier_core::{
    BoxError, CancellationToken, Command, CommandHandler, Error, ErrorDisposition, ErrorFilter,
    Event, EventHandler, FilterStage, Message, Outcome, PostHandleFilter, PreHandleFilter, Query,
    QueryHandler,
};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

/// Address of a cancellation token, for asserting every step saw the same one.
pub fn token_addr(cancel: &CancellationToken) -> usize {
    cancel as *const CancellationToken as usize
}

// ============================================================================
// Journal
// ============================================================================

/// A shared, ordered log of calls.
///
/// Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Journal {
    /// Create an empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn record(&self, entry: impl Into<String>) {
        self.entries.lock().unwrap().push(entry.into());
    }

    /// A copy of the entries, in recording order.
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }

    /// Remove all entries.
    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }
}

// ============================================================================
// Recording Filter
// ============================================================================

/// A filter in all three roles that records each call.
///
/// Writes `"{name}.pre"`, `"{name}.post"` and `"{name}.error"` to its
/// journal. Observed errors and the address of every cancellation token it
/// receives are kept for inspection.
#[derive(Debug, Clone)]
pub struct RecordingFilter {
    name: &'static str,
    journal: Journal,
    disposition: ErrorDisposition,
    fail_on: Option<FilterStage>,
    errors: Arc<Mutex<Vec<String>>>,
    tokens: Arc<Mutex<Vec<usize>>>,
}

impl RecordingFilter {
    /// Create a filter that lets everything through and propagates failures.
    pub fn new(name: &'static str, journal: Journal) -> Self {
        Self {
            name,
            journal,
            disposition: ErrorDisposition::Propagate,
            fail_on: None,
            errors: Arc::new(Mutex::new(Vec::new())),
            tokens: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answer every observed failure with `disposition`.
    pub fn with_disposition(mut self, disposition: ErrorDisposition) -> Self {
        self.disposition = disposition;
        self
    }

    /// Fail in the given role, after recording the call.
    pub fn fail_on(mut self, stage: FilterStage) -> Self {
        self.fail_on = Some(stage);
        self
    }

    /// The display form of every failure observed in the error role.
    pub fn observed_errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }

    /// Addresses of the cancellation tokens received, in call order.
    pub fn tokens(&self) -> Vec<usize> {
        self.tokens.lock().unwrap().clone()
    }

    fn visit(&self, stage: FilterStage, cancel: &CancellationToken) -> Result<(), BoxError> {
        let suffix = match stage {
            FilterStage::Pre => "pre",
            FilterStage::Post => "post",
            FilterStage::Error => "error",
        };
        self.journal.record(format!("{}.{suffix}", self.name));
        self.tokens.lock().unwrap().push(token_addr(cancel));

        if self.fail_on == Some(stage) {
            return Err(format!("{} rejected", self.name).into());
        }
        Ok(())
    }

    fn observe(
        &self,
        error: &Error,
        cancel: &CancellationToken,
    ) -> Result<ErrorDisposition, BoxError> {
        self.errors.lock().unwrap().push(error.to_string());
        self.visit(FilterStage::Error, cancel)?;
        Ok(self.disposition)
    }
}

impl PreHandleFilter for RecordingFilter {
    async fn on_command(&self, _cmd: &dyn Message, cancel: &CancellationToken) -> Result<(), BoxError> {
        self.visit(FilterStage::Pre, cancel)
    }

    async fn on_event(&self, _evt: &dyn Message, cancel: &CancellationToken) -> Result<(), BoxError> {
        self.visit(FilterStage::Pre, cancel)
    }

    async fn on_query(
        &self,
        _query: &dyn Message,
        cancel: &CancellationToken,
    ) -> Result<(), BoxError> {
        self.visit(FilterStage::Pre, cancel)
    }
}

impl PostHandleFilter for RecordingFilter {
    async fn on_command(
        &self,
        _cmd: &dyn Message,
        _result: Outcome<'_>,
        cancel: &CancellationToken,
    ) -> Result<(), BoxError> {
        self.visit(FilterStage::Post, cancel)
    }

    async fn on_event(&self, _evt: &dyn Message, cancel: &CancellationToken) -> Result<(), BoxError> {
        self.visit(FilterStage::Post, cancel)
    }

    async fn on_query(
        &self,
        _query: &dyn Message,
        _result: Outcome<'_>,
        cancel: &CancellationToken,
    ) -> Result<(), BoxError> {
        self.visit(FilterStage::Post, cancel)
    }
}

impl ErrorFilter for RecordingFilter {
    async fn on_command(
        &self,
        _cmd: &dyn Message,
        error: &Error,
        cancel: &CancellationToken,
    ) -> Result<ErrorDisposition, BoxError> {
        self.observe(error, cancel)
    }

    async fn on_event(
        &self,
        _evt: &dyn Message,
        error: &Error,
        cancel: &CancellationToken,
    ) -> Result<ErrorDisposition, BoxError> {
        self.observe(error, cancel)
    }

    async fn on_query(
        &self,
        _query: &dyn Message,
        error: &Error,
        cancel: &CancellationToken,
    ) -> Result<ErrorDisposition, BoxError> {
        self.observe(error, cancel)
    }
}

// ============================================================================
// Counting Handler
// ============================================================================

/// A handler of any command, event or query that counts its calls.
///
/// Records its name in the journal on every call. Commands and queries get
/// the default value of their output.
#[derive(Debug, Clone)]
pub struct CountingHandler {
    name: &'static str,
    journal: Journal,
    count: Arc<AtomicUsize>,
    tokens: Arc<Mutex<Vec<usize>>>,
}

impl CountingHandler {
    /// Create a handler writing `name` to `journal`.
    pub fn new(name: &'static str, journal: Journal) -> Self {
        Self {
            name,
            journal,
            count: Arc::new(AtomicUsize::new(0)),
            tokens: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of calls so far.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Addresses of the cancellation tokens received, in call order.
    pub fn tokens(&self) -> Vec<usize> {
        self.tokens.lock().unwrap().clone()
    }

    fn hit(&self, cancel: &CancellationToken) {
        self.count.fetch_add(1, Ordering::SeqCst);
        self.tokens.lock().unwrap().push(token_addr(cancel));
        self.journal.record(self.name);
    }
}

impl<C: Command> CommandHandler<C> for CountingHandler {
    async fn handle(&self, _cmd: &C, cancel: &CancellationToken) -> Result<C::Output, BoxError> {
        self.hit(cancel);
        Ok(C::Output::default())
    }
}

impl<E: Event> EventHandler<E> for CountingHandler {
    async fn handle(&self, _evt: &E, cancel: &CancellationToken) -> Result<(), BoxError> {
        self.hit(cancel);
        Ok(())
    }
}

impl<Q: Query> QueryHandler<Q> for CountingHandler {
    async fn handle(&self, _query: &Q, cancel: &CancellationToken) -> Result<Q::Output, BoxError> {
        self.hit(cancel);
        Ok(Q::Output::default())
    }
}
