//! Ledger entry persistence operations.
//!
//! Entries are immutable once created — there are no update operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use souk_core::{Currency, PaymentIntentRef, UserId};
use souk_ledger::{EntryType, LedgerEntry, LedgerEntryId};
use uuid::Uuid;

use super::decode_error;

/// Insert a ledger entry row.
pub async fn insert(pool: &PgPool, entry: &LedgerEntry) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO ledger_entries (id, account, currency, amount_minor,
         entry_type, cause_ref, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(entry.id.as_uuid())
    .bind(entry.account.as_uuid())
    .bind(entry.currency.as_str())
    .bind(entry.amount_minor)
    .bind(entry.entry_type.as_str())
    .bind(entry.cause_ref.as_str())
    .bind(entry.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load every ledger entry, in creation order.
pub async fn load_all(pool: &PgPool) -> Result<Vec<LedgerEntry>, sqlx::Error> {
    let rows = sqlx::query_as::<_, LedgerRow>(
        "SELECT id, account, currency, amount_minor, entry_type, cause_ref, created_at
         FROM ledger_entries ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(LedgerRow::into_entry).collect()
}

#[derive(sqlx::FromRow)]
struct LedgerRow {
    id: Uuid,
    account: Uuid,
    currency: String,
    amount_minor: i64,
    entry_type: String,
    cause_ref: String,
    created_at: DateTime<Utc>,
}

impl LedgerRow {
    fn into_entry(self) -> Result<LedgerEntry, sqlx::Error> {
        let entry_type = EntryType::parse(&self.entry_type)
            .ok_or_else(|| decode_error("entry type", &self.entry_type))?;
        let currency = Currency::new(self.currency.clone())
            .map_err(|_| decode_error("currency", &self.currency))?;

        Ok(LedgerEntry {
            id: LedgerEntryId::from_uuid(self.id),
            account: UserId::from_uuid(self.account),
            currency,
            amount_minor: self.amount_minor,
            entry_type,
            cause_ref: PaymentIntentRef::new(self.cause_ref),
            created_at: self.created_at,
        })
    }
}
