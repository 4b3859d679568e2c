//! The dispute record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use souk_core::{
    DisputeId, DisputePublicId, Money, OrderId, PaymentIntentRef, ProcessorDisputeId, UserId,
};

use crate::error::DisputeError;
use crate::status::DisputeStatus;

/// A chargeback dispute reported by the payment processor.
///
/// Immutable once created except for `status`, `metadata`, and
/// `evidence_due_by`. The record references its order by internal id —
/// client-facing layers translate this to the order's public id and strip
/// the processor-identifying fields before serializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dispute {
    /// Internal storage id. Never serialized to clients.
    pub id: DisputeId,
    /// Externally addressable dispute id.
    pub public_id: DisputePublicId,
    /// The processor's id for this chargeback. Globally unique.
    pub processor_dispute_id: ProcessorDisputeId,
    /// The payment intent the disputed charge sits under.
    pub payment_intent_ref: PaymentIntentRef,
    /// The disputed order, by internal id.
    pub order_id: OrderId,
    /// Buyer on the disputed order.
    pub buyer_id: UserId,
    /// Seller on the disputed order.
    pub seller_id: UserId,
    /// Disputed amount.
    pub amount: Money,
    /// Current lifecycle state.
    pub status: DisputeStatus,
    /// Processor-supplied reason code (e.g. "fraudulent").
    pub reason: String,
    /// Deadline for submitting evidence, if the processor set one.
    pub evidence_due_by: Option<DateTime<Utc>>,
    /// Free-form processor metadata.
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Dispute {
    /// Create a new dispute in `OPEN` from a processor notification.
    #[allow(clippy::too_many_arguments)]
    pub fn open(
        processor_dispute_id: ProcessorDisputeId,
        payment_intent_ref: PaymentIntentRef,
        order_id: OrderId,
        buyer_id: UserId,
        seller_id: UserId,
        amount: Money,
        reason: impl Into<String>,
        evidence_due_by: Option<DateTime<Utc>>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: DisputeId::new(),
            public_id: DisputePublicId::new(),
            processor_dispute_id,
            payment_intent_ref,
            order_id,
            buyer_id,
            seller_id,
            amount,
            status: DisputeStatus::Open,
            reason: reason.into(),
            evidence_due_by,
            metadata: serde_json::Value::Null,
            created_at: now,
            updated_at: now,
        }
    }

    /// Move the dispute to a new status.
    ///
    /// # Errors
    ///
    /// - [`DisputeError::TerminalState`] if the dispute has already resolved.
    /// - [`DisputeError::InvalidTransition`] if the edge is not in the state
    ///   machine.
    pub fn transition(&mut self, to: DisputeStatus) -> Result<(), DisputeError> {
        if self.status.is_terminal() {
            return Err(DisputeError::TerminalState {
                dispute: self.public_id,
                status: self.status,
            });
        }
        if !self.status.can_transition_to(to) {
            return Err(DisputeError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Whether the caller id is one of the dispute's parties.
    pub fn is_party(&self, user: &UserId) -> bool {
        &self.buyer_id == user || &self.seller_id == user
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn sample() -> Dispute {
        Dispute::open(
            ProcessorDisputeId::new("dp_1"),
            PaymentIntentRef::new("pi_1"),
            OrderId::new(),
            UserId::new(),
            UserId::new(),
            Money::from_parts(8000, "USD").unwrap(),
            "fraudulent",
            None,
        )
    }

    #[test]
    fn opens_in_open() {
        let dispute = sample();
        assert_eq!(dispute.status, DisputeStatus::Open);
        assert_eq!(dispute.created_at, dispute.updated_at);
    }

    #[test]
    fn transition_walks_active_states() {
        let mut dispute = sample();
        dispute.transition(DisputeStatus::NeedsResponse).unwrap();
        dispute.transition(DisputeStatus::UnderReview).unwrap();
        dispute.transition(DisputeStatus::Won).unwrap();
        assert_eq!(dispute.status, DisputeStatus::Won);
    }

    #[test]
    fn terminal_rejects_everything_and_keeps_status() {
        let mut dispute = sample();
        dispute.transition(DisputeStatus::Lost).unwrap();

        for target in [
            DisputeStatus::Open,
            DisputeStatus::UnderReview,
            DisputeStatus::WarningNeedsResponse,
            DisputeStatus::NeedsResponse,
            DisputeStatus::Won,
            DisputeStatus::Lost,
            DisputeStatus::Closed,
        ] {
            let err = dispute.transition(target).unwrap_err();
            assert!(matches!(err, DisputeError::TerminalState { .. }));
            assert_eq!(dispute.status, DisputeStatus::Lost);
        }
    }

    #[test]
    fn self_transition_is_invalid_not_terminal() {
        let mut dispute = sample();
        let err = dispute.transition(DisputeStatus::Open).unwrap_err();
        assert!(matches!(err, DisputeError::InvalidTransition { .. }));
    }

    #[test]
    fn party_check_matches_both_sides_only() {
        let dispute = sample();
        assert!(dispute.is_party(&dispute.buyer_id));
        assert!(dispute.is_party(&dispute.seller_id));
        assert!(!dispute.is_party(&UserId::new()));
    }
}
