//! Marketplace actor roles.

use serde::{Deserialize, Serialize};

/// The role an authenticated caller acts under.
///
/// Buyer and seller are peers scoped to their own orders and disputes;
/// support and admin are staff roles with cross-account visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    /// Purchased the order under dispute.
    Buyer,
    /// Listed and sold the order under dispute.
    Seller,
    /// Staff role: read/write on every dispute, no escrow actions.
    Support,
    /// Staff role: full access including escrow release/refund.
    Admin,
}

impl ActorRole {
    /// The canonical string name of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buyer => "buyer",
            Self::Seller => "seller",
            Self::Support => "support",
            Self::Admin => "admin",
        }
    }

    /// Whether this is a staff role (support or admin).
    pub fn is_staff(&self) -> bool {
        matches!(self, Self::Support | Self::Admin)
    }

    /// Parse a canonical role name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "buyer" => Some(Self::Buyer),
            "seller" => Some(Self::Seller),
            "support" => Some(Self::Support),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for ActorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staff_roles() {
        assert!(ActorRole::Admin.is_staff());
        assert!(ActorRole::Support.is_staff());
        assert!(!ActorRole::Buyer.is_staff());
        assert!(!ActorRole::Seller.is_staff());
    }

    #[test]
    fn role_as_str_all_variants() {
        assert_eq!(ActorRole::Buyer.as_str(), "buyer");
        assert_eq!(ActorRole::Seller.as_str(), "seller");
        assert_eq!(ActorRole::Support.as_str(), "support");
        assert_eq!(ActorRole::Admin.as_str(), "admin");
    }

    #[test]
    fn role_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&ActorRole::Support).unwrap(),
            "\"support\""
        );
    }
}
