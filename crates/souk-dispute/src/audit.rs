//! The audit log, as consumed by the timeline reconstructor.
//!
//! Audit entries are written by whichever subsystem took an action — escrow
//! release, dispute transition, a failed processor call — and read back here
//! to rebuild what happened. The `target_id` is a heterogeneous join key: an
//! order's internal id, a dispute's public id, or a payment-intent reference,
//! depending on who wrote the entry. Matching is therefore an explicit
//! any-of-these predicate, never a typed foreign key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use parking_lot::RwLock;
use uuid::Uuid;

/// One audit record. Append-only; consumers never mutate entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: Uuid,
    /// Who acted: a user id, or the system sentinel
    /// [`souk_core::SYSTEM_ACTOR`] for automated writers.
    pub actor_id: String,
    /// What happened, e.g. `ESCROW_RELEASED` or `DISPUTE_STATUS_CHANGED`.
    pub action: String,
    /// Heterogeneous join key: order internal id, dispute public id, or
    /// payment-intent reference, as a string.
    pub target_id: String,
    /// Error message, when the audited action failed.
    pub error: Option<String>,
    /// Free-form context recorded by the writer.
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl AuditLogEntry {
    /// Build an entry for a successful action.
    pub fn new(
        actor_id: impl Into<String>,
        action: impl Into<String>,
        target_id: impl Into<String>,
        metadata: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            actor_id: actor_id.into(),
            action: action.into(),
            target_id: target_id.into(),
            error: None,
            metadata,
            created_at: Utc::now(),
        }
    }

    /// Attach an error message to the entry.
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// Thread-safe, cloneable append-only audit log.
#[derive(Debug, Default)]
pub struct AuditLog {
    entries: Arc<RwLock<Vec<AuditLogEntry>>>,
}

impl Clone for AuditLog {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl AuditLog {
    /// Create an empty audit log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn append(&self, entry: AuditLogEntry) {
        self.entries.write().push(entry);
    }

    /// All entries whose target matches any of the given keys.
    pub fn find_any(&self, keys: &[&str]) -> Vec<AuditLogEntry> {
        self.entries
            .read()
            .iter()
            .filter(|e| keys.contains(&e.target_id.as_str()))
            .cloned()
            .collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_any_matches_across_key_kinds() {
        let log = AuditLog::new();
        log.append(AuditLogEntry::new(
            "system",
            "ESCROW_RELEASED",
            "order-internal-1",
            serde_json::Value::Null,
        ));
        log.append(AuditLogEntry::new(
            "admin-1",
            "DISPUTE_STATUS_CHANGED",
            "dispute-public-1",
            serde_json::Value::Null,
        ));
        log.append(AuditLogEntry::new(
            "system",
            "REFUND_FAILED",
            "pi_abc",
            serde_json::Value::Null,
        ));
        log.append(AuditLogEntry::new(
            "system",
            "UNRELATED",
            "order-internal-2",
            serde_json::Value::Null,
        ));

        let found = log.find_any(&["order-internal-1", "dispute-public-1", "pi_abc"]);
        assert_eq!(found.len(), 3);
        assert!(found.iter().all(|e| e.target_id != "order-internal-2"));
    }

    #[test]
    fn with_error_sets_message() {
        let entry = AuditLogEntry::new("system", "REFUND_FAILED", "pi_x", serde_json::Value::Null)
            .with_error("resource_missing");
        assert_eq!(entry.error.as_deref(), Some("resource_missing"));
    }
}
