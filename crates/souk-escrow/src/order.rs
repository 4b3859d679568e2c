//! The escrow-relevant order record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use souk_core::{Money, OrderId, OrderPublicId, PaymentIntentRef, UserId};

/// The escrow state of an order's funds.
///
/// `Held` is the only state that permits a transition; `Released` and
/// `Refunded` are terminal. The escrow fields mutate only through the
/// [`EscrowController`](crate::controller::EscrowController).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EscrowStatus {
    /// Funds collected from the buyer, not yet settled either way.
    Held,
    /// Funds transferred to the seller. Terminal.
    Released,
    /// Funds returned to the buyer. Terminal.
    Refunded,
}

impl EscrowStatus {
    /// The canonical string name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Held => "HELD",
            Self::Released => "RELEASED",
            Self::Refunded => "REFUNDED",
        }
    }

    /// Whether this status permits no further transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Released | Self::Refunded)
    }

    /// Parse a canonical status name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "HELD" => Some(Self::Held),
            "RELEASED" => Some(Self::Released),
            "REFUNDED" => Some(Self::Refunded),
            _ => None,
        }
    }
}

impl std::fmt::Display for EscrowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An order as the escrow subsystem sees it.
///
/// Orders are created at checkout (outside this subsystem) and never
/// destroyed — they are part of the financial record. `id` is the internal
/// storage id and must never reach a client; `public_id` is the externally
/// addressable handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Internal storage id. Never serialized to clients.
    pub id: OrderId,
    /// Externally addressable order id.
    pub public_id: OrderPublicId,
    /// The buyer whose funds are held.
    pub buyer_id: UserId,
    /// The seller awaiting release.
    pub seller_id: UserId,
    /// Total held amount.
    pub total: Money,
    /// Current escrow state.
    pub escrow_status: EscrowStatus,
    /// When the escrow hold window started.
    pub hold_start_at: DateTime<Utc>,
    /// When the funds actually entered escrow.
    pub escrow_held_at: DateTime<Utc>,
    /// The processor payment intent the funds sit under.
    pub payment_intent_ref: PaymentIntentRef,
}

impl OrderRecord {
    /// Build a freshly held order. Used when ingesting checkout results and
    /// when seeding development/test data.
    pub fn held(
        buyer_id: UserId,
        seller_id: UserId,
        total: Money,
        payment_intent_ref: PaymentIntentRef,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: OrderId::new(),
            public_id: OrderPublicId::new(),
            buyer_id,
            seller_id,
            total,
            escrow_status: EscrowStatus::Held,
            hold_start_at: now,
            escrow_held_at: now,
            payment_intent_ref,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_is_the_only_non_terminal_status() {
        assert!(!EscrowStatus::Held.is_terminal());
        assert!(EscrowStatus::Released.is_terminal());
        assert!(EscrowStatus::Refunded.is_terminal());
    }

    #[test]
    fn status_as_str_all_variants() {
        assert_eq!(EscrowStatus::Held.as_str(), "HELD");
        assert_eq!(EscrowStatus::Released.as_str(), "RELEASED");
        assert_eq!(EscrowStatus::Refunded.as_str(), "REFUNDED");
    }

    #[test]
    fn status_serializes_screaming_case() {
        assert_eq!(
            serde_json::to_string(&EscrowStatus::Held).unwrap(),
            "\"HELD\""
        );
    }

    #[test]
    fn held_constructor_starts_in_held() {
        let order = OrderRecord::held(
            UserId::new(),
            UserId::new(),
            Money::from_parts(4999, "USD").unwrap(),
            PaymentIntentRef::new("pi_checkout"),
        );
        assert_eq!(order.escrow_status, EscrowStatus::Held);
        assert_ne!(order.id.as_uuid(), order.public_id.as_uuid());
    }
}
