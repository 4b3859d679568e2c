//! Order persistence operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use souk_core::{Currency, Money, OrderId, OrderPublicId, PaymentIntentRef, UserId};
use souk_escrow::{EscrowStatus, OrderRecord};
use uuid::Uuid;

use super::decode_error;

/// Insert or update an order row.
pub async fn upsert(pool: &PgPool, order: &OrderRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO orders (id, public_id, buyer_id, seller_id, amount_minor,
         currency, escrow_status, hold_start_at, escrow_held_at, payment_intent_ref)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
         ON CONFLICT (id) DO UPDATE SET escrow_status = EXCLUDED.escrow_status",
    )
    .bind(order.id.as_uuid())
    .bind(order.public_id.as_uuid())
    .bind(order.buyer_id.as_uuid())
    .bind(order.seller_id.as_uuid())
    .bind(order.total.amount_minor)
    .bind(order.total.currency.as_str())
    .bind(order.escrow_status.as_str())
    .bind(order.hold_start_at)
    .bind(order.escrow_held_at)
    .bind(order.payment_intent_ref.as_str())
    .execute(pool)
    .await?;

    Ok(())
}

/// Load every order row.
pub async fn load_all(pool: &PgPool) -> Result<Vec<OrderRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, OrderRow>(
        "SELECT id, public_id, buyer_id, seller_id, amount_minor, currency,
         escrow_status, hold_start_at, escrow_held_at, payment_intent_ref
         FROM orders",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(OrderRow::into_record).collect()
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    public_id: Uuid,
    buyer_id: Uuid,
    seller_id: Uuid,
    amount_minor: i64,
    currency: String,
    escrow_status: String,
    hold_start_at: DateTime<Utc>,
    escrow_held_at: DateTime<Utc>,
    payment_intent_ref: String,
}

impl OrderRow {
    fn into_record(self) -> Result<OrderRecord, sqlx::Error> {
        let escrow_status = EscrowStatus::parse(&self.escrow_status)
            .ok_or_else(|| decode_error("escrow status", &self.escrow_status))?;
        let currency = Currency::new(self.currency.clone())
            .map_err(|_| decode_error("currency", &self.currency))?;

        Ok(OrderRecord {
            id: OrderId::from_uuid(self.id),
            public_id: OrderPublicId::from_uuid(self.public_id),
            buyer_id: UserId::from_uuid(self.buyer_id),
            seller_id: UserId::from_uuid(self.seller_id),
            total: Money::new(self.amount_minor, currency),
            escrow_status,
            hold_start_at: self.hold_start_at,
            escrow_held_at: self.escrow_held_at,
            payment_intent_ref: PaymentIntentRef::new(self.payment_intent_ref),
        })
    }
}
