//! Identity envelope shared by commands, events and queries.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Identity fields of a message: who created it, when, and under which id.
///
/// Fields are public so messages can be rehydrated from external storage.
/// Well-behaved callers treat them as immutable after construction.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Debug)]
/// struct RegisterUser {
///     envelope: Envelope,
///     email: String,
/// }
///
/// impl Message for RegisterUser {
///     fn envelope(&self) -> Option<&Envelope> {
///         Some(&self.envelope)
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Envelope {
    /// Unique identifier of the message instance.
    pub id: Uuid,
    /// When the message was created.
    pub created_on: DateTime<Utc>,
    /// Identifier of whoever created the message.
    pub created_by: Option<String>,
}

impl Envelope {
    /// Create an envelope with a fresh id, the current time and no creator.
    pub fn new() -> Self {
        Self::with(Uuid::new_v4(), Utc::now(), None)
    }

    /// Create an envelope from known values.
    pub fn with(id: Uuid, created_on: DateTime<Utc>, created_by: Option<String>) -> Self {
        Self {
            id,
            created_on,
            created_by,
        }
    }

    /// Set the creator.
    pub fn created_by(mut self, created_by: impl Into<String>) -> Self {
        self.created_by = Some(created_by.into());
        self
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fresh_envelope() {
        let envelope = Envelope::new();
        let observed = Utc::now();

        assert!(!envelope.id.is_nil());
        assert!(envelope.created_on <= observed);
        assert!(envelope.created_by.is_none());
    }

    #[test]
    fn test_fresh_envelopes_are_distinct() {
        assert_ne!(Envelope::new().id, Envelope::default().id);
    }

    #[test]
    fn test_rehydrate() {
        let id = Uuid::new_v4();
        let created_on = Utc.with_ymd_and_hms(2017, 3, 1, 12, 0, 0).unwrap();
        let envelope = Envelope::with(id, created_on, Some("importer".into()));

        assert_eq!(envelope.id, id);
        assert_eq!(envelope.created_on, created_on);
        assert_eq!(envelope.created_by.as_deref(), Some("importer"));
    }

    #[test]
    fn test_created_by_builder() {
        let envelope = Envelope::new().created_by("alice");
        assert_eq!(envelope.created_by.as_deref(), Some("alice"));
    }
}
