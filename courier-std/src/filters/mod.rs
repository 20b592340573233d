//! Standard filters.
//!
//! - [`LoggingFilter`] - structured logging around every dispatch

pub mod logging;

pub use logging::LoggingFilter;
