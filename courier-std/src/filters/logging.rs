//! Logging Filter - Observability for dispatches.

use courier_core::{
    BoxError, CancellationToken, Error, ErrorDisposition, ErrorFilter, Message, MessageKind,
    Outcome, PostHandleFilter, PreHandleFilter,
};

/// A filter that logs every dispatch.
///
/// Register it in all three roles with `RegistryBuilder::filter`. Emits
/// `tracing` events when the `tracing` feature is enabled:
///
/// - `debug` before the handler and after it succeeded
/// - `warn` when the dispatch failed
///
/// Each event carries `kind`, `message` (the concrete type name) and, when
/// the message has an envelope, `message_id`. It never swallows failures.
///
/// # Example
///
/// ```rust,ignore
/// let registry = RegistryBuilder::new()
///     .filter(LoggingFilter::named("users"))
///     .command::<RegisterUser, _>(handler)
///     .build()?;
/// ```
#[derive(Debug, Clone, Copy)]
pub struct LoggingFilter {
    name: &'static str,
}

impl LoggingFilter {
    /// Create a new `LoggingFilter` with a default name.
    pub fn new() -> Self {
        Self { name: "mediator" }
    }

    /// Create a new `LoggingFilter` with a custom name.
    ///
    /// The name is attached to every log event.
    pub fn named(name: &'static str) -> Self {
        Self { name }
    }

    /// The name attached to log events.
    pub fn name(&self) -> &'static str {
        self.name
    }

    fn before(&self, kind: MessageKind, message: &dyn Message) {
        #[cfg(feature = "tracing")]
        {
            let message_id = message.envelope().map(|e| e.id);
            tracing::debug!(
                name = self.name,
                kind = kind.as_str(),
                message = message.type_name(),
                message_id = ?message_id,
                "dispatching"
            );
        }

        #[cfg(not(feature = "tracing"))]
        {
            let _ = (kind, message);
        }
    }

    fn after(&self, kind: MessageKind, message: &dyn Message) {
        #[cfg(feature = "tracing")]
        {
            let message_id = message.envelope().map(|e| e.id);
            tracing::debug!(
                name = self.name,
                kind = kind.as_str(),
                message = message.type_name(),
                message_id = ?message_id,
                "dispatched"
            );
        }

        #[cfg(not(feature = "tracing"))]
        {
            let _ = (kind, message);
        }
    }

    fn failed(&self, kind: MessageKind, message: &dyn Message, error: &Error) -> ErrorDisposition {
        #[cfg(feature = "tracing")]
        {
            let message_id = message.envelope().map(|e| e.id);
            tracing::warn!(
                name = self.name,
                kind = kind.as_str(),
                message = message.type_name(),
                message_id = ?message_id,
                error = %error,
                "dispatch failed"
            );
        }

        #[cfg(not(feature = "tracing"))]
        {
            let _ = (kind, message, error);
        }

        ErrorDisposition::Propagate
    }
}

impl Default for LoggingFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl PreHandleFilter for LoggingFilter {
    async fn on_command(&self, cmd: &dyn Message, _cancel: &CancellationToken) -> Result<(), BoxError> {
        self.before(MessageKind::Command, cmd);
        Ok(())
    }

    async fn on_event(&self, evt: &dyn Message, _cancel: &CancellationToken) -> Result<(), BoxError> {
        self.before(MessageKind::Event, evt);
        Ok(())
    }

    async fn on_query(&self, query: &dyn Message, _cancel: &CancellationToken) -> Result<(), BoxError> {
        self.before(MessageKind::Query, query);
        Ok(())
    }
}

impl PostHandleFilter for LoggingFilter {
    async fn on_command(
        &self,
        cmd: &dyn Message,
        _result: Outcome<'_>,
        _cancel: &CancellationToken,
    ) -> Result<(), BoxError> {
        self.after(MessageKind::Command, cmd);
        Ok(())
    }

    async fn on_event(&self, evt: &dyn Message, _cancel: &CancellationToken) -> Result<(), BoxError> {
        self.after(MessageKind::Event, evt);
        Ok(())
    }

    async fn on_query(
        &self,
        query: &dyn Message,
        _result: Outcome<'_>,
        _cancel: &CancellationToken,
    ) -> Result<(), BoxError> {
        self.after(MessageKind::Query, query);
        Ok(())
    }
}

impl ErrorFilter for LoggingFilter {
    async fn on_command(
        &self,
        cmd: &dyn Message,
        error: &Error,
        _cancel: &CancellationToken,
    ) -> Result<ErrorDisposition, BoxError> {
        Ok(self.failed(MessageKind::Command, cmd, error))
    }

    async fn on_event(
        &self,
        evt: &dyn Message,
        error: &Error,
        _cancel: &CancellationToken,
    ) -> Result<ErrorDisposition, BoxError> {
        Ok(self.failed(MessageKind::Event, evt, error))
    }

    async fn on_query(
        &self,
        query: &dyn Message,
        error: &Error,
        _cancel: &CancellationToken,
    ) -> Result<ErrorDisposition, BoxError> {
        Ok(self.failed(MessageKind::Query, query, error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::{DynErrorFilter, DynPreHandleFilter, Envelope};

    struct Signup {
        envelope: Envelope,
    }

    impl Message for Signup {
        fn envelope(&self) -> Option<&Envelope> {
            Some(&self.envelope)
        }
    }

    #[tokio::test]
    async fn test_logging_filter_passes_through() {
        let filter = LoggingFilter::new();
        let cancel = CancellationToken::new();
        let msg = Signup {
            envelope: Envelope::new(),
        };

        assert!(filter.pre_handle(MessageKind::Command, &msg, &cancel).await.is_ok());
    }

    #[tokio::test]
    async fn test_logging_filter_never_swallows() {
        let filter = LoggingFilter::named("users");
        let cancel = CancellationToken::new();
        let msg = Signup {
            envelope: Envelope::new(),
        };

        let disposition = filter
            .on_error(MessageKind::Event, &msg, &Error::Canceled, &cancel)
            .await
            .unwrap();
        assert_eq!(disposition, ErrorDisposition::Propagate);
        assert_eq!(filter.name(), "users");
    }
}
