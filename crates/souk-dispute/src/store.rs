//! Dispute storage.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use souk_core::{DisputeId, DisputePublicId, ProcessorDisputeId};

use crate::dispute::Dispute;
use crate::error::DisputeError;
use crate::status::DisputeStatus;

/// Thread-safe, cloneable dispute store.
///
/// Enforces the one-record-per-processor-dispute-id invariant at insert
/// time, and runs status transitions under the write lock so a terminal
/// dispute cannot be reopened by a concurrent writer.
#[derive(Debug, Default)]
pub struct DisputeStore {
    inner: Arc<RwLock<Disputes>>,
}

#[derive(Debug, Default)]
struct Disputes {
    by_id: HashMap<DisputeId, Dispute>,
    public_index: HashMap<DisputePublicId, DisputeId>,
    processor_index: HashMap<ProcessorDisputeId, DisputeId>,
}

impl Clone for DisputeStore {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl DisputeStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new dispute.
    ///
    /// # Errors
    ///
    /// [`DisputeError::DuplicateProcessorDispute`] if a dispute already
    /// exists for the same processor dispute id. The store is untouched.
    pub fn create(&self, dispute: Dispute) -> Result<Dispute, DisputeError> {
        let mut inner = self.inner.write();
        if inner
            .processor_index
            .contains_key(&dispute.processor_dispute_id)
        {
            return Err(DisputeError::DuplicateProcessorDispute(
                dispute.processor_dispute_id.clone(),
            ));
        }
        inner
            .processor_index
            .insert(dispute.processor_dispute_id.clone(), dispute.id);
        inner.public_index.insert(dispute.public_id, dispute.id);
        inner.by_id.insert(dispute.id, dispute.clone());
        tracing::info!(
            dispute = %dispute.public_id,
            status = %dispute.status,
            reason = %dispute.reason,
            "dispute created"
        );
        Ok(dispute)
    }

    /// Look up a dispute by its public id.
    pub fn get_by_public(&self, public_id: &DisputePublicId) -> Option<Dispute> {
        let inner = self.inner.read();
        let id = inner.public_index.get(public_id)?;
        inner.by_id.get(id).cloned()
    }

    /// Snapshot of all disputes, newest first by creation time.
    pub fn list(&self) -> Vec<Dispute> {
        let mut disputes: Vec<_> = self.inner.read().by_id.values().cloned().collect();
        disputes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        disputes
    }

    /// Atomically transition the dispute with the given public id.
    ///
    /// The terminal check and the write happen under one lock acquisition,
    /// so there is no window in which two concurrent resolutions both land.
    pub fn transition(
        &self,
        public_id: &DisputePublicId,
        to: DisputeStatus,
    ) -> Result<Dispute, DisputeError> {
        let mut inner = self.inner.write();
        let id = *inner
            .public_index
            .get(public_id)
            .ok_or(DisputeError::NotFound(*public_id))?;
        // The index only ever points at live records.
        let mut dispute = inner.by_id[&id].clone();
        let from = dispute.status;
        dispute.transition(to)?;
        inner.by_id.insert(id, dispute.clone());
        tracing::info!(dispute = %public_id, %from, %to, "dispute transitioned");
        Ok(dispute)
    }

    /// Seed a previously persisted dispute (startup hydration), bypassing
    /// the duplicate check's error path only in the sense that persisted
    /// data is assumed consistent.
    pub fn restore(&self, dispute: Dispute) {
        let mut inner = self.inner.write();
        inner
            .processor_index
            .insert(dispute.processor_dispute_id.clone(), dispute.id);
        inner.public_index.insert(dispute.public_id, dispute.id);
        inner.by_id.insert(dispute.id, dispute);
    }

    /// Number of stored disputes.
    pub fn len(&self) -> usize {
        self.inner.read().by_id.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use souk_core::{Money, OrderId, PaymentIntentRef, UserId};

    fn dispute(processor_id: &str) -> Dispute {
        Dispute::open(
            ProcessorDisputeId::new(processor_id),
            PaymentIntentRef::new("pi_1"),
            OrderId::new(),
            UserId::new(),
            UserId::new(),
            Money::from_parts(1200, "USD").unwrap(),
            "product_not_received",
            None,
        )
    }

    #[test]
    fn create_and_get() {
        let store = DisputeStore::new();
        let created = store.create(dispute("dp_a")).unwrap();
        assert_eq!(store.get_by_public(&created.public_id), Some(created));
    }

    #[test]
    fn duplicate_processor_id_is_rejected() {
        let store = DisputeStore::new();
        store.create(dispute("dp_a")).unwrap();
        let err = store.create(dispute("dp_a")).unwrap_err();
        assert!(matches!(err, DisputeError::DuplicateProcessorDispute(_)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn transition_commits() {
        let store = DisputeStore::new();
        let created = store.create(dispute("dp_a")).unwrap();
        let updated = store
            .transition(&created.public_id, DisputeStatus::UnderReview)
            .unwrap();
        assert_eq!(updated.status, DisputeStatus::UnderReview);
        assert_eq!(
            store.get_by_public(&created.public_id).unwrap().status,
            DisputeStatus::UnderReview
        );
    }

    #[test]
    fn transition_on_terminal_leaves_store_unchanged() {
        let store = DisputeStore::new();
        let created = store.create(dispute("dp_a")).unwrap();
        store.transition(&created.public_id, DisputeStatus::Won).unwrap();

        let err = store
            .transition(&created.public_id, DisputeStatus::Open)
            .unwrap_err();
        assert!(matches!(err, DisputeError::TerminalState { .. }));
        assert_eq!(
            store.get_by_public(&created.public_id).unwrap().status,
            DisputeStatus::Won
        );
    }

    #[test]
    fn transition_unknown_is_not_found() {
        let store = DisputeStore::new();
        let err = store
            .transition(&DisputePublicId::new(), DisputeStatus::Closed)
            .unwrap_err();
        assert!(matches!(err, DisputeError::NotFound(_)));
    }

    #[test]
    fn list_is_newest_first() {
        let store = DisputeStore::new();
        let mut older = dispute("dp_old");
        older.created_at = older.created_at - chrono::Duration::hours(1);
        let older = store.create(older).unwrap();
        let newer = store.create(dispute("dp_new")).unwrap();

        let listed = store.list();
        assert_eq!(listed[0].public_id, newer.public_id);
        assert_eq!(listed[1].public_id, older.public_id);
    }
}
