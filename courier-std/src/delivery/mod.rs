//! Event delivery strategies.
//!
//! A [`DeliveryStrategy`] decides how a broadcast event reaches its resolved
//! handlers:
//!
//! - [`SequentialDelivery`] - one by one, halting on the first failure
//! - [`ConcurrentDelivery`] - all at once on the caller's task, failures collected

pub(crate) mod concurrent;
pub(crate) mod sequential;
pub(crate) mod traits;

pub use concurrent::ConcurrentDelivery;
pub use sequential::SequentialDelivery;
pub use traits::DeliveryStrategy;
