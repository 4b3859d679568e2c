//! # souk-core — Shared Domain Primitives
//!
//! Foundation types used across the escrow, ledger, and dispute crates:
//!
//! - **Identifiers** ([`id`]): newtype ids for users, orders, disputes, and
//!   processor references. Internal ids and public ids are distinct types so
//!   the compiler keeps them from being mixed up.
//!
//! - **Money** ([`money`]): integer minor-unit amounts with a validated
//!   ISO 4217 currency code. No floating point anywhere near a balance.
//!
//! - **Roles** ([`role`]): the marketplace actor roles used for access
//!   decisions (buyer, seller, support, admin).

pub mod error;
pub mod id;
pub mod money;
pub mod role;

pub use error::ValidationError;
pub use id::{
    DisputeId, DisputePublicId, OrderId, OrderPublicId, PaymentIntentRef, ProcessorDisputeId,
    UserId,
};
pub use money::{Currency, Money};
pub use role::ActorRole;

/// Actor id recorded on audit entries written by automated processes rather
/// than a human operator. The timeline reconstructor collapses this to a
/// `SYSTEM` actor in client responses.
pub const SYSTEM_ACTOR: &str = "system";
