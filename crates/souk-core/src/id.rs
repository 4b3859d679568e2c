//! Identifier newtypes.
//!
//! Internal ids ([`OrderId`]) address storage rows and never appear in a
//! client-facing response; public ids ([`OrderPublicId`], [`DisputePublicId`])
//! are the externally addressable handles. Keeping them as distinct types
//! makes "serialize the wrong one" a compile error rather than a data leak.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create an identifier from an existing UUID.
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

uuid_id!(
    /// A marketplace user (buyer, seller, or staff member).
    UserId,
    ""
);

uuid_id!(
    /// Internal storage id of an order. Never serialized to clients.
    OrderId,
    ""
);

uuid_id!(
    /// The externally addressable id of an order.
    OrderPublicId,
    ""
);

uuid_id!(
    /// Internal storage id of a dispute. Never serialized to clients.
    DisputeId,
    ""
);

uuid_id!(
    /// The externally addressable id of a dispute.
    DisputePublicId,
    ""
);

/// The payment processor's id for a dispute/chargeback. Globally unique —
/// exactly one dispute record exists per processor dispute id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcessorDisputeId(String);

impl ProcessorDisputeId {
    /// Wrap a processor-issued dispute id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProcessorDisputeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reference to a payment intent / transaction at the external processor.
/// Every ledger entry carries the intent that caused it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaymentIntentRef(String);

impl PaymentIntentRef {
    /// Wrap a processor-issued payment intent reference.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw reference string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PaymentIntentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
