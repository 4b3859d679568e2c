//! # souk-escrow — Order Escrow State & Controller
//!
//! Buyer funds collected at checkout are held against the order until an
//! admin releases them to the seller or refunds them to the buyer. The hold
//! is single-shot: from `HELD`, exactly one of release or refund may ever
//! succeed, and the losing call gets an invariant-violation error rather
//! than a silent no-op.
//!
//! - **Order** ([`order`]): the escrow-relevant order record and the
//!   [`EscrowStatus`] machine.
//!
//! - **Store** ([`store`]): the order store with atomic
//!   check-and-transition updates.
//!
//! - **Controller** ([`controller`]): the admin-facing release/refund
//!   operations, which execute the processor side-effect and commit local
//!   state as one unit.

pub mod controller;
pub mod error;
pub mod order;
pub mod store;

pub use controller::{EscrowController, EscrowOutcome};
pub use error::EscrowError;
pub use order::{EscrowStatus, OrderRecord};
pub use store::OrderStore;
