//! Closure-backed registry.
//!
//! Lets any existing container back the mediator: supply one closure for
//! single resolution and one for multi resolution.

use courier_core::{CapabilityKey, HandlerRegistry, Resolved};
use std::fmt;

/// A [`HandlerRegistry`] delegating to two closures.
///
/// # Example
/// ```ignore
/// let registry = FnRegistry::new(
///     move |key| container.get(key),
///     move |key| container.get_all(key),
/// );
/// ```
pub struct FnRegistry<One, All> {
    one: One,
    all: All,
}

impl<One, All> FnRegistry<One, All>
where
    One: Fn(&CapabilityKey) -> Option<Resolved> + Send + Sync + 'static,
    All: Fn(&CapabilityKey) -> Vec<Resolved> + Send + Sync + 'static,
{
    /// Create a registry from a resolve-one and a resolve-all closure.
    pub fn new(one: One, all: All) -> Self {
        Self { one, all }
    }
}

impl<One, All> HandlerRegistry for FnRegistry<One, All>
where
    One: Fn(&CapabilityKey) -> Option<Resolved> + Send + Sync + 'static,
    All: Fn(&CapabilityKey) -> Vec<Resolved> + Send + Sync + 'static,
{
    fn resolve_one(&self, key: &CapabilityKey) -> Option<Resolved> {
        (self.one)(key)
    }

    fn resolve_all(&self, key: &CapabilityKey) -> Vec<Resolved> {
        (self.all)(key)
    }
}

impl<One, All> fmt::Debug for FnRegistry<One, All> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnRegistry").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::{Message, MessageType, Role};

    struct Probe;
    impl Message for Probe {}

    #[test]
    fn test_closures_receive_key() {
        let expected = CapabilityKey::event_for(MessageType::of::<Probe>());
        let registry = FnRegistry::new(
            move |key: &CapabilityKey| (*key == expected).then(|| Resolved::new(7_u8)),
            |key: &CapabilityKey| match key.role() {
                Role::PreFilter => vec![Resolved::new(1_u8), Resolved::new(2_u8)],
                _ => Vec::new(),
            },
        );

        assert!(registry.resolve_one(&expected).unwrap().is::<u8>());
        assert!(
            registry
                .resolve_one(&CapabilityKey::filter(Role::PreFilter))
                .is_none()
        );
        assert_eq!(
            registry
                .resolve_all(&CapabilityKey::filter(Role::PreFilter))
                .len(),
            2
        );
    }
}
