//! Capability resolution for dispute-scoped operations.
//!
//! Every dispute route answers the same question — "what may this caller do
//! with this dispute?" — so the answer is computed in exactly one place.
//! Handlers consult the returned capability instead of re-deriving role and
//! party checks inline.

use souk_core::{ActorRole, UserId};

use crate::dispute::Dispute;

/// What a caller may do with a particular dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AccessLevel {
    /// No access. The caller should not learn anything beyond "denied".
    None,
    /// May read the dispute, its messages, and its timeline.
    Read,
    /// May read and post messages.
    Write,
}

impl AccessLevel {
    /// Whether this level permits reading.
    pub fn can_read(&self) -> bool {
        *self >= AccessLevel::Read
    }

    /// Whether this level permits posting messages.
    pub fn can_write(&self) -> bool {
        *self >= AccessLevel::Write
    }
}

/// Resolve the caller's capability on a dispute.
///
/// Staff (admin/support) and the dispute's own buyer and seller get `Write`;
/// everyone else gets `None`. Identity comes from the authenticated caller,
/// never from request content.
pub fn resolve_access(dispute: &Dispute, caller_id: &UserId, role: ActorRole) -> AccessLevel {
    if role.is_staff() || dispute.is_party(caller_id) {
        AccessLevel::Write
    } else {
        AccessLevel::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use souk_core::{Money, OrderId, PaymentIntentRef, ProcessorDisputeId};

    fn dispute() -> Dispute {
        Dispute::open(
            ProcessorDisputeId::new("dp_1"),
            PaymentIntentRef::new("pi_1"),
            OrderId::new(),
            UserId::new(),
            UserId::new(),
            Money::from_parts(500, "USD").unwrap(),
            "general",
            None,
        )
    }

    #[test]
    fn parties_get_write() {
        let d = dispute();
        assert_eq!(
            resolve_access(&d, &d.buyer_id, ActorRole::Buyer),
            AccessLevel::Write
        );
        assert_eq!(
            resolve_access(&d, &d.seller_id, ActorRole::Seller),
            AccessLevel::Write
        );
    }

    #[test]
    fn staff_get_write_regardless_of_party() {
        let d = dispute();
        let stranger = UserId::new();
        assert_eq!(
            resolve_access(&d, &stranger, ActorRole::Admin),
            AccessLevel::Write
        );
        assert_eq!(
            resolve_access(&d, &stranger, ActorRole::Support),
            AccessLevel::Write
        );
    }

    #[test]
    fn strangers_get_none() {
        let d = dispute();
        let stranger = UserId::new();
        let level = resolve_access(&d, &stranger, ActorRole::Buyer);
        assert_eq!(level, AccessLevel::None);
        assert!(!level.can_read());
        assert!(!level.can_write());
    }

    #[test]
    fn a_party_with_the_wrong_role_is_still_a_party() {
        // Party membership is by stored id, not by the role claimed at
        // authentication time.
        let d = dispute();
        assert_eq!(
            resolve_access(&d, &d.buyer_id, ActorRole::Seller),
            AccessLevel::Write
        );
    }

    #[test]
    fn levels_are_ordered() {
        assert!(AccessLevel::Write.can_read());
        assert!(AccessLevel::Read.can_read());
        assert!(!AccessLevel::Read.can_write());
    }
}
