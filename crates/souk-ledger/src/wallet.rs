//! The wallet funding service.
//!
//! ## Design Choice: Non-Idempotent Funding
//!
//! `fund_wallet` is a user-initiated monetary action, not a retry-safe
//! intent. Calling it twice with identical parameters produces two
//! independent payment intents and two independent ledger credits — the
//! second call is a second deposit, not a retry of the first. Do not "fix"
//! this with a deduplication key; an idempotent surface would belong to a
//! different, explicitly idempotent operation.

use std::sync::Arc;

use souk_core::{Money, UserId, ValidationError};

use crate::entry::{EntryType, LedgerEntry};
use crate::error::LedgerError;
use crate::processor::PaymentProcessor;
use crate::store::LedgerStore;

/// Wraps the ledger with funding operations backed by the external
/// processor.
#[derive(Clone)]
pub struct WalletService {
    ledger: LedgerStore,
    processor: Arc<dyn PaymentProcessor>,
}

impl WalletService {
    /// Create a wallet service over the given ledger and processor.
    pub fn new(ledger: LedgerStore, processor: Arc<dyn PaymentProcessor>) -> Self {
        Self { ledger, processor }
    }

    /// Add funds to an account's wallet.
    ///
    /// Creates a fresh payment intent at the processor, then writes exactly
    /// one ledger credit referencing it. All-or-nothing: if the processor
    /// step fails, no ledger entry is written.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Validation`] if the amount is not strictly positive.
    /// - [`LedgerError::Processor`] if the processor rejects the intent;
    ///   the ledger is untouched in that case.
    pub fn fund_wallet(&self, account: UserId, amount: Money) -> Result<LedgerEntry, LedgerError> {
        if amount.amount_minor <= 0 {
            return Err(ValidationError::NonPositiveAmount(amount.amount_minor).into());
        }

        let intent = self.processor.create_payment_intent(&amount)?;
        let entry = self
            .ledger
            .append(account, amount, EntryType::WalletCredit, intent);

        tracing::info!(
            account = %account,
            entry_id = %entry.id,
            amount = entry.amount_minor,
            currency = %entry.currency,
            "wallet funded"
        );
        Ok(entry)
    }

    /// The derived balance for an account and currency, in minor units.
    pub fn balance(&self, account: &UserId, currency: &souk_core::Currency) -> i64 {
        self.ledger.balance(account, currency)
    }
}
