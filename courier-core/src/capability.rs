//! Capability keys: the lookup coordinates handed to a registry.

use crate::message::{Command, Event, Message, Query};
use std::{
    any::TypeId,
    fmt,
    hash::{Hash, Hasher},
};

/// Identity of a concrete type, with its name kept for diagnostics.
///
/// Equality and hashing only look at the [`TypeId`].
#[derive(Debug, Clone, Copy)]
pub struct MessageType {
    id: TypeId,
    name: &'static str,
}

impl MessageType {
    /// The identity of `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The runtime identity of a message, whatever static type it is held under.
    pub fn of_message(message: &dyn Message) -> Self {
        Self {
            id: message.as_any().type_id(),
            name: message.type_name(),
        }
    }

    /// The underlying [`TypeId`].
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The full type name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    fn is_unit(&self) -> bool {
        self.id == TypeId::of::<()>()
    }
}

impl PartialEq for MessageType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MessageType {}

impl Hash for MessageType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// The role a registered component plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Handles a command.
    Command,
    /// Handles an event.
    Event,
    /// Handles a query.
    Query,
    /// Runs before the handler.
    PreFilter,
    /// Runs after a successful handler.
    PostFilter,
    /// Observes failures.
    ErrorFilter,
}

/// A (role, concrete message type) pair used to look up handlers and filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CapabilityKey {
    role: Role,
    message: Option<MessageType>,
    output: Option<MessageType>,
}

impl CapabilityKey {
    /// Key of the handler for command type `C`.
    pub fn command<C: Command>() -> Self {
        Self::command_for::<C::Output>(MessageType::of::<C>())
    }

    /// Key of the handler for a command whose runtime type is `message` and
    /// whose result type is `R`.
    pub fn command_for<R: 'static>(message: MessageType) -> Self {
        Self {
            role: Role::Command,
            message: Some(message),
            output: Some(MessageType::of::<R>()),
        }
    }

    /// Key of the handlers for event type `E`.
    pub fn event<E: Event>() -> Self {
        Self::event_for(MessageType::of::<E>())
    }

    /// Key of the handlers for an event whose runtime type is `message`.
    pub fn event_for(message: MessageType) -> Self {
        Self {
            role: Role::Event,
            message: Some(message),
            output: None,
        }
    }

    /// Key of the handler for query type `Q`.
    pub fn query<Q: Query>() -> Self {
        Self::query_for::<Q::Output>(MessageType::of::<Q>())
    }

    /// Key of the handler for a query whose runtime type is `message` and
    /// whose result type is `R`.
    pub fn query_for<R: 'static>(message: MessageType) -> Self {
        Self {
            role: Role::Query,
            message: Some(message),
            output: Some(MessageType::of::<R>()),
        }
    }

    /// Key of a filter role. Filters are not bound to a message type.
    ///
    /// # Panics
    ///
    /// Panics if `role` is a handler role.
    pub fn filter(role: Role) -> Self {
        assert!(
            matches!(role, Role::PreFilter | Role::PostFilter | Role::ErrorFilter),
            "{role:?} is not a filter role"
        );
        Self {
            role,
            message: None,
            output: None,
        }
    }

    /// The role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// The concrete message type, absent for filter roles.
    pub fn message(&self) -> Option<MessageType> {
        self.message
    }

    /// The result type, absent for events and filters.
    pub fn output(&self) -> Option<MessageType> {
        self.output
    }
}

impl fmt::Display for CapabilityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let role = match self.role {
            Role::Command => "CommandHandler",
            Role::Event => "EventHandler",
            Role::Query => "QueryHandler",
            Role::PreFilter => return f.write_str("PreHandleFilter"),
            Role::PostFilter => return f.write_str("PostHandleFilter"),
            Role::ErrorFilter => return f.write_str("ErrorFilter"),
        };
        write!(f, "{role}<")?;
        if let Some(message) = self.message {
            write!(f, "{message}")?;
        }
        match self.output {
            Some(output) if !output.is_unit() => write!(f, ", {output}>"),
            _ => f.write_str(">"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ping;
    impl Message for Ping {}
    impl Command for Ping {
        type Output = ();
    }

    struct Lookup;
    impl Message for Lookup {}
    impl Command for Lookup {
        type Output = u64;
    }
    impl Query for Lookup {
        type Output = u64;
    }

    struct Pinged;
    impl Message for Pinged {}
    impl Event for Pinged {}

    #[test]
    fn test_runtime_key_matches_static_key() {
        let ping = Ping;
        let erased: &dyn Command<Output = ()> = &ping;
        let runtime = CapabilityKey::command_for::<()>(MessageType::of_message(erased.as_message()));

        assert_eq!(runtime, CapabilityKey::command::<Ping>());
    }

    #[test]
    fn test_roles_are_distinct() {
        assert_ne!(CapabilityKey::command::<Lookup>(), CapabilityKey::query::<Lookup>());
        assert_ne!(
            CapabilityKey::command::<Lookup>(),
            CapabilityKey::command_for::<u32>(MessageType::of::<Lookup>())
        );
    }

    #[test]
    fn test_display() {
        let ping = CapabilityKey::command::<Ping>().to_string();
        assert!(ping.starts_with("CommandHandler<"));
        assert!(ping.ends_with("Ping>"));

        let lookup = CapabilityKey::query::<Lookup>().to_string();
        assert!(lookup.starts_with("QueryHandler<"));
        assert!(lookup.ends_with("Lookup, u64>"));

        assert!(CapabilityKey::event::<Pinged>().to_string().starts_with("EventHandler<"));
        assert_eq!(CapabilityKey::filter(Role::PreFilter).to_string(), "PreHandleFilter");
    }

    #[test]
    #[should_panic(expected = "not a filter role")]
    fn test_filter_key_rejects_handler_role() {
        let _ = CapabilityKey::filter(Role::Event);
    }
}
