//! Audit log persistence operations.
//!
//! Entries are immutable once created — there are no update operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use souk_dispute::AuditLogEntry;
use uuid::Uuid;

/// Insert an audit entry row.
pub async fn insert(pool: &PgPool, entry: &AuditLogEntry) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO audit_log (id, actor_id, action, target_id, error, metadata, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(entry.id)
    .bind(&entry.actor_id)
    .bind(&entry.action)
    .bind(&entry.target_id)
    .bind(&entry.error)
    .bind(&entry.metadata)
    .bind(entry.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load every audit entry, in creation order.
pub async fn load_all(pool: &PgPool) -> Result<Vec<AuditLogEntry>, sqlx::Error> {
    let rows = sqlx::query_as::<_, AuditRow>(
        "SELECT id, actor_id, action, target_id, error, metadata, created_at
         FROM audit_log ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(AuditRow::into_entry).collect())
}

#[derive(sqlx::FromRow)]
struct AuditRow {
    id: Uuid,
    actor_id: String,
    action: String,
    target_id: String,
    error: Option<String>,
    metadata: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl AuditRow {
    fn into_entry(self) -> AuditLogEntry {
        AuditLogEntry {
            id: self.id,
            actor_id: self.actor_id,
            action: self.action,
            target_id: self.target_id,
            error: self.error,
            metadata: self.metadata,
            created_at: self.created_at,
        }
    }
}
