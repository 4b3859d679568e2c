//! Dispute and dispute-message persistence operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use souk_core::{
    ActorRole, Currency, DisputeId, DisputePublicId, Money, OrderId, PaymentIntentRef,
    ProcessorDisputeId, UserId,
};
use souk_dispute::{Dispute, DisputeMessage, DisputeStatus, MessageId};
use uuid::Uuid;

use super::decode_error;

/// Insert or update a dispute row.
pub async fn upsert(pool: &PgPool, dispute: &Dispute) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO disputes (id, public_id, processor_dispute_id, payment_intent_ref,
         order_id, buyer_id, seller_id, amount_minor, currency, status, reason,
         evidence_due_by, metadata, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
         ON CONFLICT (id) DO UPDATE SET
           status = EXCLUDED.status,
           metadata = EXCLUDED.metadata,
           evidence_due_by = EXCLUDED.evidence_due_by,
           updated_at = EXCLUDED.updated_at",
    )
    .bind(dispute.id.as_uuid())
    .bind(dispute.public_id.as_uuid())
    .bind(dispute.processor_dispute_id.as_str())
    .bind(dispute.payment_intent_ref.as_str())
    .bind(dispute.order_id.as_uuid())
    .bind(dispute.buyer_id.as_uuid())
    .bind(dispute.seller_id.as_uuid())
    .bind(dispute.amount.amount_minor)
    .bind(dispute.amount.currency.as_str())
    .bind(dispute.status.as_str())
    .bind(&dispute.reason)
    .bind(dispute.evidence_due_by)
    .bind(&dispute.metadata)
    .bind(dispute.created_at)
    .bind(dispute.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load every dispute row.
pub async fn load_all(pool: &PgPool) -> Result<Vec<Dispute>, sqlx::Error> {
    let rows = sqlx::query_as::<_, DisputeRow>(
        "SELECT id, public_id, processor_dispute_id, payment_intent_ref, order_id,
         buyer_id, seller_id, amount_minor, currency, status, reason,
         evidence_due_by, metadata, created_at, updated_at
         FROM disputes",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(DisputeRow::into_record).collect()
}

/// Insert a message row. Messages are append-only.
pub async fn insert_message(pool: &PgPool, message: &DisputeMessage) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO dispute_messages (id, dispute_public_id, sender_role,
         sender_id, body, created_at)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(message.id.as_uuid())
    .bind(message.dispute_id.as_uuid())
    .bind(message.sender_role.as_str())
    .bind(message.sender_id.as_uuid())
    .bind(&message.body)
    .bind(message.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load every message row, in creation order.
pub async fn load_all_messages(pool: &PgPool) -> Result<Vec<DisputeMessage>, sqlx::Error> {
    let rows = sqlx::query_as::<_, MessageRow>(
        "SELECT id, dispute_public_id, sender_role, sender_id, body, created_at
         FROM dispute_messages ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(MessageRow::into_record).collect()
}

#[derive(sqlx::FromRow)]
struct DisputeRow {
    id: Uuid,
    public_id: Uuid,
    processor_dispute_id: String,
    payment_intent_ref: String,
    order_id: Uuid,
    buyer_id: Uuid,
    seller_id: Uuid,
    amount_minor: i64,
    currency: String,
    status: String,
    reason: String,
    evidence_due_by: Option<DateTime<Utc>>,
    metadata: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl DisputeRow {
    fn into_record(self) -> Result<Dispute, sqlx::Error> {
        let status = DisputeStatus::parse(&self.status)
            .ok_or_else(|| decode_error("dispute status", &self.status))?;
        let currency = Currency::new(self.currency.clone())
            .map_err(|_| decode_error("currency", &self.currency))?;

        Ok(Dispute {
            id: DisputeId::from_uuid(self.id),
            public_id: DisputePublicId::from_uuid(self.public_id),
            processor_dispute_id: ProcessorDisputeId::new(self.processor_dispute_id),
            payment_intent_ref: PaymentIntentRef::new(self.payment_intent_ref),
            order_id: OrderId::from_uuid(self.order_id),
            buyer_id: UserId::from_uuid(self.buyer_id),
            seller_id: UserId::from_uuid(self.seller_id),
            amount: Money::new(self.amount_minor, currency),
            status,
            reason: self.reason,
            evidence_due_by: self.evidence_due_by,
            metadata: self.metadata,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: Uuid,
    dispute_public_id: Uuid,
    sender_role: String,
    sender_id: Uuid,
    body: String,
    created_at: DateTime<Utc>,
}

impl MessageRow {
    fn into_record(self) -> Result<DisputeMessage, sqlx::Error> {
        let sender_role = ActorRole::parse(&self.sender_role)
            .ok_or_else(|| decode_error("sender role", &self.sender_role))?;

        Ok(DisputeMessage {
            id: MessageId::from_uuid(self.id),
            dispute_id: DisputePublicId::from_uuid(self.dispute_public_id),
            sender_role,
            sender_id: UserId::from_uuid(self.sender_id),
            body: self.body,
            created_at: self.created_at,
        })
    }
}
