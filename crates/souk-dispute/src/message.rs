//! The append-only dispute messaging channel.
//!
//! ## Design Choice: Status-Agnostic Posting
//!
//! Posting stays open in every dispute status, including terminal ones.
//! Unlike an order chat that goes read-only once disputed, the dispute
//! channel exists precisely so parties can keep leaving evidence and
//! commentary after the fact. Do not add a status gate here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use souk_core::{ActorRole, DisputePublicId, UserId, ValidationError};
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use uuid::Uuid;

/// Maximum message body length, in characters after trimming.
pub const MAX_MESSAGE_LEN: usize = 2000;

/// Identifier of a dispute message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(Uuid);

impl MessageId {
    /// Create a new random message id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a message id from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One message in a dispute's channel. Never edited or deleted.
///
/// `sender_id` and `sender_role` are taken from the authenticated caller at
/// post time; a sender field arriving in request content is discarded before
/// this type is ever constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisputeMessage {
    pub id: MessageId,
    /// The dispute this message belongs to, by public id.
    pub dispute_id: DisputePublicId,
    pub sender_role: ActorRole,
    pub sender_id: UserId,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Validate and normalize a message body: trimmed, non-empty, at most
/// [`MAX_MESSAGE_LEN`] characters.
pub fn validate_body(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("message_body"));
    }
    let len = trimmed.chars().count();
    if len > MAX_MESSAGE_LEN {
        return Err(ValidationError::FieldTooLong {
            field: "message_body",
            max: MAX_MESSAGE_LEN,
            actual: len,
        });
    }
    Ok(trimmed.to_string())
}

/// Thread-safe, cloneable message store, bucketed per dispute.
#[derive(Debug, Default)]
pub struct MessageStore {
    by_dispute: Arc<RwLock<HashMap<DisputePublicId, Vec<DisputeMessage>>>>,
}

impl Clone for MessageStore {
    fn clone(&self) -> Self {
        Self {
            by_dispute: Arc::clone(&self.by_dispute),
        }
    }
}

impl MessageStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message. The body must already be validated; sender identity
    /// comes from the authenticated caller.
    pub fn post(
        &self,
        dispute_id: DisputePublicId,
        sender_role: ActorRole,
        sender_id: UserId,
        body: String,
    ) -> DisputeMessage {
        let message = DisputeMessage {
            id: MessageId::new(),
            dispute_id,
            sender_role,
            sender_id,
            body,
            created_at: Utc::now(),
        };
        self.by_dispute
            .write()
            .entry(dispute_id)
            .or_default()
            .push(message.clone());
        tracing::debug!(
            dispute = %dispute_id,
            sender = %sender_id,
            role = sender_role.as_str(),
            "dispute message posted"
        );
        message
    }

    /// All messages for a dispute, oldest first.
    ///
    /// Ascending by creation time — the opposite of the timeline's ordering,
    /// and deliberately so.
    pub fn list(&self, dispute_id: &DisputePublicId) -> Vec<DisputeMessage> {
        let mut messages = self
            .by_dispute
            .read()
            .get(dispute_id)
            .cloned()
            .unwrap_or_default();
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        messages
    }

    /// Seed a previously persisted message (startup hydration).
    pub fn restore(&self, message: DisputeMessage) {
        self.by_dispute
            .write()
            .entry(message.dispute_id)
            .or_default()
            .push(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_is_trimmed() {
        assert_eq!(validate_body("  hello  ").unwrap(), "hello");
    }

    #[test]
    fn empty_and_whitespace_bodies_are_rejected() {
        assert!(validate_body("").is_err());
        assert!(validate_body("   \n\t ").is_err());
    }

    #[test]
    fn body_at_limit_passes_over_limit_fails() {
        let at_limit = "x".repeat(MAX_MESSAGE_LEN);
        assert!(validate_body(&at_limit).is_ok());

        let over = "x".repeat(MAX_MESSAGE_LEN + 1);
        assert!(matches!(
            validate_body(&over),
            Err(ValidationError::FieldTooLong { actual, .. }) if actual == MAX_MESSAGE_LEN + 1
        ));
    }

    #[test]
    fn limit_counts_characters_not_bytes() {
        // Multi-byte characters: 2000 of them is within the limit even
        // though the byte length is far larger.
        let wide = "é".repeat(MAX_MESSAGE_LEN);
        assert!(wide.len() > MAX_MESSAGE_LEN);
        assert!(validate_body(&wide).is_ok());
    }

    #[test]
    fn list_is_oldest_first() {
        let store = MessageStore::new();
        let dispute = DisputePublicId::new();
        let sender = UserId::new();
        let first = store.post(dispute, ActorRole::Buyer, sender, "one".into());
        let second = store.post(dispute, ActorRole::Seller, UserId::new(), "two".into());
        let third = store.post(dispute, ActorRole::Admin, UserId::new(), "three".into());

        let listed = store.list(&dispute);
        assert_eq!(
            listed.iter().map(|m| m.id).collect::<Vec<_>>(),
            vec![first.id, second.id, third.id]
        );
        assert!(listed.windows(2).all(|w| w[0].created_at <= w[1].created_at));
    }

    #[test]
    fn disputes_are_isolated() {
        let store = MessageStore::new();
        let a = DisputePublicId::new();
        let b = DisputePublicId::new();
        store.post(a, ActorRole::Buyer, UserId::new(), "for a".into());
        assert!(store.list(&b).is_empty());
        assert_eq!(store.list(&a).len(), 1);
    }
}
