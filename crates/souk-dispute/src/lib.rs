//! # souk-dispute — Dispute Lifecycle, Messaging & Timeline
//!
//! When the payment processor reports a chargeback, a dispute record is
//! created against the order and moves through a validated state machine
//! until it resolves. Around that record sit two append-only narratives:
//! party-authored messages and the reconstructed event timeline.
//!
//! - **Status** ([`status`]): the dispute state machine. Active states are
//!   mutually reachable; `WON`/`LOST`/`CLOSED` are terminal and reject every
//!   further transition.
//!
//! - **Dispute** ([`dispute`]): the dispute record itself.
//!
//! - **Store** ([`store`]): dispute storage with atomic transitions and a
//!   uniqueness guarantee per processor dispute id.
//!
//! - **Access** ([`access`]): the single capability-resolution point every
//!   dispute-scoped operation consults.
//!
//! - **Messages** ([`message`]): the append-only dispute chat, listed oldest
//!   first.
//!
//! - **Audit & Timeline** ([`audit`], [`timeline`]): audit entries joined to
//!   a dispute by any of its three identifiers and merged with a synthetic
//!   creation event into a newest-first timeline. The two orderings really
//!   are opposite; both are contractual.

pub mod access;
pub mod audit;
pub mod dispute;
pub mod error;
pub mod message;
pub mod status;
pub mod store;
pub mod timeline;

pub use access::{resolve_access, AccessLevel};
pub use audit::{AuditLog, AuditLogEntry};
pub use dispute::Dispute;
pub use error::DisputeError;
pub use message::{validate_body, DisputeMessage, MessageId, MessageStore, MAX_MESSAGE_LEN};
pub use status::DisputeStatus;
pub use store::DisputeStore;
pub use timeline::{reconstruct_timeline, TimelineActor, TimelineEvent};
