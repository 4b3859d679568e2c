//! # Database Persistence Layer
//!
//! Postgres persistence via SQLx. The layer is **optional**: when
//! `DATABASE_URL` is set, orders, ledger entries, disputes, messages, and
//! audit entries are persisted and re-hydrated at startup. When absent, the
//! API runs in-memory only (development and tests).
//!
//! In-memory stores remain the request-time source of truth; every
//! persisted table is a write-through shadow of one store.

pub mod audit;
pub mod disputes;
pub mod ledger;
pub mod orders;

use sqlx::postgres::{PgPool, PgPoolOptions};

/// Initialize the database connection pool and run migrations.
///
/// Returns `None` if `DATABASE_URL` is not set (in-memory-only mode).
/// Returns `Err` if the URL is set but the connection or migration fails.
pub async fn init_pool() -> Result<Option<PgPool>, sqlx::Error> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            tracing::warn!(
                "DATABASE_URL not set — running in-memory only mode. \
                 State will not survive restarts."
            );
            return Ok(None);
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(&url)
        .await?;

    tracing::info!("Connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(Some(pool))
}

/// Map an unknown enum name in a persisted row to a decode error.
pub(crate) fn decode_error(what: &str, value: &str) -> sqlx::Error {
    sqlx::Error::Decode(format!("unknown {what} in database row: '{value}'").into())
}
