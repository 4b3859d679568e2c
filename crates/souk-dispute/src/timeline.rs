//! Timeline reconstruction.
//!
//! A dispute's timeline is rebuilt on every read from two sources: a
//! synthetic creation event derived from the dispute record itself, and the
//! audit entries that join to the dispute through any of its three
//! identifiers (order internal id, dispute public id, payment-intent ref).
//! The merged list is returned newest first — the opposite of the message
//! channel's ordering, and contractual in both directions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use souk_core::SYSTEM_ACTOR;
use uuid::Uuid;

use crate::audit::AuditLog;
use crate::dispute::Dispute;

/// Who a timeline event is attributed to in client responses.
///
/// Audit entries carry raw actor ids; the timeline collapses them to two
/// presentation buckets so operator identities are not echoed to parties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimelineActor {
    /// An automated process wrote the entry.
    System,
    /// A human operator wrote the entry.
    Admin,
}

/// One normalized timeline event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub actor: TimelineActor,
    /// Action label, e.g. `DISPUTE_CREATED` or `ESCROW_REFUNDED`.
    pub action: String,
    /// Human-readable detail, when the source carried one.
    pub message: Option<String>,
    pub metadata: serde_json::Value,
}

/// Action label of the synthetic creation event.
pub const DISPUTE_CREATED: &str = "DISPUTE_CREATED";

/// Rebuild the timeline for a dispute, newest first.
pub fn reconstruct_timeline(dispute: &Dispute, audit: &AuditLog) -> Vec<TimelineEvent> {
    let order_key = dispute.order_id.to_string();
    let dispute_key = dispute.public_id.to_string();
    let intent_key = dispute.payment_intent_ref.to_string();

    let mut events: Vec<TimelineEvent> = audit
        .find_any(&[&order_key, &dispute_key, &intent_key])
        .into_iter()
        .map(|entry| {
            let actor = if entry.actor_id == SYSTEM_ACTOR {
                TimelineActor::System
            } else {
                TimelineActor::Admin
            };
            TimelineEvent {
                id: entry.id,
                timestamp: entry.created_at,
                actor,
                action: entry.action,
                message: entry.error,
                metadata: entry.metadata,
            }
        })
        .collect();

    events.push(TimelineEvent {
        id: *dispute.public_id.as_uuid(),
        timestamp: dispute.created_at,
        actor: TimelineActor::System,
        action: DISPUTE_CREATED.to_string(),
        message: Some(dispute.reason.clone()),
        metadata: serde_json::Value::Null,
    });

    events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    events
}
