//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers via
//! the `State` extractor.
//!
//! The in-memory stores are the source of truth at request time; the
//! optional Postgres pool shadows them for durability. Stores are hydrated
//! from the database at startup and written through on every mutation.
//! Persistence failures are logged and do not fail the request — the
//! in-memory state has already committed and stays consistent.

use std::sync::Arc;

use sqlx::PgPool;

use souk_dispute::{AuditLog, AuditLogEntry, DisputeStore, MessageStore};
use souk_escrow::{EscrowController, OrderStore};
use souk_ledger::{InMemoryProcessor, LedgerStore, PaymentProcessor, WalletService};

use crate::db;

/// Application configuration, read from the environment and CLI at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port the HTTP server binds to.
    pub port: u16,
    /// Shared bearer secret. `None` disables authentication (development).
    pub auth_token: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            auth_token: None,
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub orders: OrderStore,
    pub disputes: DisputeStore,
    pub messages: MessageStore,
    pub audit: AuditLog,
    pub ledger: LedgerStore,
    pub wallet: WalletService,
    pub escrow: EscrowController,
    pub db: Option<PgPool>,
}

impl AppState {
    /// Build state with the development in-memory processor.
    pub fn new(config: AppConfig, db: Option<PgPool>) -> Self {
        Self::with_processor(config, db, Arc::new(InMemoryProcessor::new()))
    }

    /// Build state over a specific payment processor implementation.
    pub fn with_processor(
        config: AppConfig,
        db: Option<PgPool>,
        processor: Arc<dyn PaymentProcessor>,
    ) -> Self {
        let orders = OrderStore::new();
        let disputes = DisputeStore::new();
        let messages = MessageStore::new();
        let audit = AuditLog::new();
        let ledger = LedgerStore::new();
        let wallet = WalletService::new(ledger.clone(), Arc::clone(&processor));
        let escrow = EscrowController::new(orders.clone(), ledger.clone(), processor);

        Self {
            config,
            orders,
            disputes,
            messages,
            audit,
            ledger,
            wallet,
            escrow,
            db,
        }
    }

    /// Load persisted rows into the in-memory stores. No-op without a pool.
    pub async fn hydrate_from_db(&self) -> Result<(), sqlx::Error> {
        let Some(pool) = &self.db else {
            return Ok(());
        };

        for order in db::orders::load_all(pool).await? {
            self.orders.insert(order);
        }
        for entry in db::ledger::load_all(pool).await? {
            self.ledger.restore(entry);
        }
        for dispute in db::disputes::load_all(pool).await? {
            self.disputes.restore(dispute);
        }
        for message in db::disputes::load_all_messages(pool).await? {
            self.messages.restore(message);
        }
        for entry in db::audit::load_all(pool).await? {
            self.audit.append(entry);
        }

        tracing::info!(
            orders = self.orders.len(),
            disputes = self.disputes.len(),
            ledger_entries = self.ledger.len(),
            audit_entries = self.audit.len(),
            "hydrated state from database"
        );
        Ok(())
    }

    /// Record an audit entry in memory and, best-effort, in the database.
    pub async fn record_audit(&self, entry: AuditLogEntry) {
        self.audit.append(entry.clone());
        if let Some(pool) = &self.db {
            if let Err(err) = db::audit::insert(pool, &entry).await {
                tracing::warn!(%err, action = %entry.action, "failed to persist audit entry");
            }
        }
    }

    /// Best-effort write-through of an order's current state.
    pub async fn persist_order(&self, order: &souk_escrow::OrderRecord) {
        if let Some(pool) = &self.db {
            if let Err(err) = db::orders::upsert(pool, order).await {
                tracing::warn!(%err, order = %order.public_id, "failed to persist order");
            }
        }
    }

    /// Best-effort write-through of a dispute's current state.
    pub async fn persist_dispute(&self, dispute: &souk_dispute::Dispute) {
        if let Some(pool) = &self.db {
            if let Err(err) = db::disputes::upsert(pool, dispute).await {
                tracing::warn!(%err, dispute = %dispute.public_id, "failed to persist dispute");
            }
        }
    }

    /// Best-effort write-through of a posted message.
    pub async fn persist_message(&self, message: &souk_dispute::DisputeMessage) {
        if let Some(pool) = &self.db {
            if let Err(err) = db::disputes::insert_message(pool, message).await {
                tracing::warn!(%err, message = %message.id, "failed to persist message");
            }
        }
    }

    /// Best-effort write-through of a ledger entry.
    pub async fn persist_ledger_entry(&self, entry: &souk_ledger::LedgerEntry) {
        if let Some(pool) = &self.db {
            if let Err(err) = db::ledger::insert(pool, entry).await {
                tracing::warn!(%err, entry = %entry.id, "failed to persist ledger entry");
            }
        }
    }
}
