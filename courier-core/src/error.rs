//! Error types for Courier.
//!
//! - [`Error`] - Everything a dispatch can fail with
//! - [`Canceled`] - Returned by handlers and filters that observe cancellation
//! - [`FilterStage`] - Which filter role raised a [`Error::Filter`]

use crate::capability::CapabilityKey;
use std::fmt;
use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The filter role that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterStage {
    /// A pre-handling filter.
    Pre,
    /// A post-handling filter.
    Post,
    /// An error-observing filter.
    Error,
}

impl fmt::Display for FilterStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FilterStage::Pre => "pre-handling",
            FilterStage::Post => "post-handling",
            FilterStage::Error => "error-observing",
        })
    }
}

/// Cooperative cancellation was observed.
///
/// Handlers and filters return this (boxed) when they notice the
/// cancellation token fired; the mediator surfaces it as [`Error::Canceled`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[error("operation was canceled")]
pub struct Canceled;

/// Top-level error type for all mediator operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A required argument was not supplied.
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),

    /// The registry had no handler for a command or query.
    #[error("no handler registered for {0}")]
    HandlerNotFound(CapabilityKey),

    /// The handler failed. Displays as the original failure.
    #[error(transparent)]
    Handler(BoxError),

    /// Cancellation was observed by a handler or filter.
    #[error("dispatch was canceled")]
    Canceled,

    /// A filter failed.
    #[error("{stage} filter failed: {source}")]
    Filter {
        /// The failing filter role.
        stage: FilterStage,
        /// The original failure.
        #[source]
        source: BoxError,
    },

    /// Several event handlers failed under a fan-out delivery strategy.
    #[error("{} event handlers failed", .0.len())]
    Aggregate(Vec<Error>),

    /// The registry returned an instance of the wrong type for a key.
    #[error("registry returned an unexpected instance for {0}")]
    UnexpectedResolution(CapabilityKey),

    /// The blocking surface could not start its runtime.
    #[error("failed to start dispatch runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

impl Error {
    /// Classify a failure raised by a handler.
    ///
    /// [`Canceled`] becomes [`Error::Canceled`]; a boxed [`Error`] (for
    /// example from a nested dispatch) is returned unchanged; anything else is
    /// wrapped in [`Error::Handler`].
    pub fn from_handler(err: BoxError) -> Self {
        if err.is::<Canceled>() {
            return Error::Canceled;
        }
        match err.downcast::<Error>() {
            Ok(inner) => *inner,
            Err(err) => Error::Handler(err),
        }
    }

    /// Classify a failure raised by a filter.
    pub fn from_filter(stage: FilterStage, err: BoxError) -> Self {
        if err.is::<Canceled>() {
            return Error::Canceled;
        }
        match err.downcast::<Error>() {
            Ok(inner) if matches!(*inner, Error::Canceled) => Error::Canceled,
            Ok(inner) => Error::Filter {
                stage,
                source: inner,
            },
            Err(source) => Error::Filter { stage, source },
        }
    }

    /// Whether this error reports cancellation.
    pub fn is_canceled(&self) -> bool {
        matches!(self, Error::Canceled)
    }

    /// Whether no handler was found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::HandlerNotFound(_))
    }

    /// The original failure raised by a handler or filter, if it is a `T`.
    pub fn downcast_ref<T: std::error::Error + 'static>(&self) -> Option<&T> {
        match self {
            Error::Handler(source) | Error::Filter { source, .. } => source.downcast_ref::<T>(),
            _ => None,
        }
    }
}

// Convenience conversions
impl From<Canceled> for Error {
    fn from(_: Canceled) -> Self {
        Error::Canceled
    }
}
