//! Message contracts.
//!
//! Three kinds of messages travel through the mediator:
//!
//! - [`Command`] - an imperative request with exactly one handler
//! - [`Event`] - a notification for zero or more handlers
//! - [`Query`] - a read request with exactly one handler
//!
//! All of them are [`Message`]s. Callers are free to hold a message behind
//! the marker abstraction (`&dyn Command<Output = R>`, `&dyn Event`, ...);
//! the runtime type is always recoverable through [`AnyMessage`].

use crate::envelope::Envelope;
use std::any::Any;

/// Type-erased view of a message.
///
/// Blanket-implemented for every [`Message`]. Calling these methods through a
/// trait object dispatches to the concrete type, which is how the mediator
/// recovers the runtime type of a message held as `&dyn Command`.
pub trait AnyMessage: Send + Sync + 'static {
    /// The message as `&dyn Any`, for downcasting to the concrete type.
    fn as_any(&self) -> &dyn Any;

    /// The message as a plain `&dyn Message`.
    fn as_message(&self) -> &dyn Message;

    /// The name of the concrete message type.
    fn type_name(&self) -> &'static str;
}

impl<T: Message> AnyMessage for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_message(&self) -> &dyn Message {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// A marker trait for everything the mediator can dispatch.
///
/// Messages must be `Send + Sync + 'static` to be safe for async use.
///
/// # Example
///
/// ```rust,ignore
/// struct UserCreated { user_id: Uuid }
///
/// impl Message for UserCreated {}
/// impl Event for UserCreated {}
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a valid Message",
    label = "must be `Send + Sync + 'static`",
    note = "Implement `Message` (or derive it) before implementing `Command`, `Event` or `Query`."
)]
pub trait Message: AnyMessage {
    /// The identity envelope carried by this message, if any.
    fn envelope(&self) -> Option<&Envelope> {
        None
    }
}

/// An imperative request handled by exactly one handler.
///
/// Commands without a result use `Output = ()`.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a Command",
    label = "missing `Command` implementation",
    note = "Commands declare their result type; use `type Output = ();` when there is none."
)]
pub trait Command: Message {
    /// The result produced by the command handler.
    type Output: Default + Send + Sync + 'static;
}

/// A notification broadcast to zero or more handlers.
pub trait Event: Message {}

/// A read request handled by exactly one handler.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a Query",
    label = "missing `Query` implementation",
    note = "Queries must declare the type they return."
)]
pub trait Query: Message {
    /// The result produced by the query handler.
    type Output: Default + Send + Sync + 'static;
}

/// The three message kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// See [`Command`].
    Command,
    /// See [`Event`].
    Event,
    /// See [`Query`].
    Query,
}

impl MessageKind {
    /// Lowercase name, suitable for log fields.
    pub const fn as_str(self) -> &'static str {
        match self {
            MessageKind::Command => "command",
            MessageKind::Event => "event",
            MessageKind::Query => "query",
        }
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::TypeId;

    struct Ping;
    impl Message for Ping {}
    impl Command for Ping {
        type Output = u32;
    }

    struct Stamped(Envelope);
    impl Message for Stamped {
        fn envelope(&self) -> Option<&Envelope> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_runtime_type_through_marker() {
        let ping = Ping;
        let erased: &dyn Command<Output = u32> = &ping;

        assert_eq!(erased.as_any().type_id(), TypeId::of::<Ping>());
        assert!(erased.type_name().ends_with("Ping"));
        assert!(erased.as_message().as_any().is::<Ping>());
    }

    #[test]
    fn test_envelope_accessor() {
        assert!(Ping.envelope().is_none());

        let envelope = Envelope::new();
        let id = envelope.id;
        let stamped = Stamped(envelope);
        assert_eq!(stamped.envelope().map(|e| e.id), Some(id));
    }

    #[test]
    fn test_message_kind_display() {
        assert_eq!(MessageKind::Command.to_string(), "command");
        assert_eq!(MessageKind::Event.as_str(), "event");
        assert_eq!(MessageKind::Query.as_str(), "query");
    }
}
