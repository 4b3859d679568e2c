//! Release and refund of held funds.

use std::sync::Arc;

use souk_core::OrderPublicId;
use souk_ledger::{EntryType, LedgerEntry, LedgerStore, PaymentProcessor};

use crate::error::EscrowError;
use crate::order::{EscrowStatus, OrderRecord};
use crate::store::OrderStore;

/// A committed release or refund: the order in its new state and the ledger
/// entry that moved the money.
#[derive(Debug, Clone)]
pub struct EscrowOutcome {
    pub order: OrderRecord,
    pub entry: LedgerEntry,
}

/// The admin-facing escrow operations.
///
/// Each operation is a single atomic unit: precondition check (`HELD`),
/// processor side-effect, status commit, and ledger entry all happen under
/// the order store's write lock, so an order's escrow transitions exactly
/// once no matter how many concurrent callers race it. The processor call
/// inside the lock is a deliberate trade: these are rare, operator-initiated
/// actions, and correctness of the single-transition guarantee outweighs
/// lock hold time.
#[derive(Clone)]
pub struct EscrowController {
    orders: OrderStore,
    ledger: LedgerStore,
    processor: Arc<dyn PaymentProcessor>,
}

impl EscrowController {
    /// Create a controller over the given stores and processor.
    pub fn new(
        orders: OrderStore,
        ledger: LedgerStore,
        processor: Arc<dyn PaymentProcessor>,
    ) -> Self {
        Self {
            orders,
            ledger,
            processor,
        }
    }

    /// Release the held funds to the seller.
    ///
    /// # Errors
    ///
    /// - [`EscrowError::NotFound`] if no order has this public id.
    /// - [`EscrowError::InvalidState`] if the escrow is not `HELD`.
    /// - [`EscrowError::Processor`] if the processor rejects the transfer;
    ///   the order stays `HELD` and the call may be retried.
    /// - [`EscrowError::CriticalState`] if the payment intent no longer
    ///   exists upstream; the order stays `HELD` and needs manual review.
    pub fn release(&self, public_id: &OrderPublicId) -> Result<EscrowOutcome, EscrowError> {
        let mut credit = None;
        let updated = self.orders.try_update_by_public(public_id, |order| {
            self.ensure_held(order)?;
            self.processor
                .release_funds(&order.payment_intent_ref)
                .map_err(|err| EscrowError::from_processor(order.public_id, err))?;

            let mut next = order.clone();
            next.escrow_status = EscrowStatus::Released;
            credit = Some(self.ledger.append(
                order.seller_id,
                order.total.clone(),
                EntryType::EscrowRelease,
                order.payment_intent_ref.clone(),
            ));
            Ok(next)
        })?;

        let order = updated.ok_or(EscrowError::NotFound(*public_id))?;
        // `credit` is written exactly when the update commits.
        let Some(entry) = credit else {
            return Err(EscrowError::NotFound(*public_id));
        };
        tracing::info!(
            order = %order.public_id,
            seller = %order.seller_id,
            amount = order.total.amount_minor,
            currency = %order.total.currency,
            "escrow released"
        );
        Ok(EscrowOutcome { order, entry })
    }

    /// Refund the held funds to the buyer.
    ///
    /// Same atomicity and error contract as [`EscrowController::release`];
    /// `reason` is forwarded to the processor for its records.
    pub fn refund(
        &self,
        public_id: &OrderPublicId,
        reason: &str,
    ) -> Result<EscrowOutcome, EscrowError> {
        let mut credit = None;
        let updated = self.orders.try_update_by_public(public_id, |order| {
            self.ensure_held(order)?;
            self.processor
                .refund(&order.payment_intent_ref, reason)
                .map_err(|err| EscrowError::from_processor(order.public_id, err))?;

            let mut next = order.clone();
            next.escrow_status = EscrowStatus::Refunded;
            credit = Some(self.ledger.append(
                order.buyer_id,
                order.total.clone(),
                EntryType::EscrowRefund,
                order.payment_intent_ref.clone(),
            ));
            Ok(next)
        })?;

        let order = updated.ok_or(EscrowError::NotFound(*public_id))?;
        let Some(entry) = credit else {
            return Err(EscrowError::NotFound(*public_id));
        };
        tracing::info!(
            order = %order.public_id,
            buyer = %order.buyer_id,
            amount = order.total.amount_minor,
            currency = %order.total.currency,
            reason,
            "escrow refunded"
        );
        Ok(EscrowOutcome { order, entry })
    }

    fn ensure_held(&self, order: &OrderRecord) -> Result<(), EscrowError> {
        if order.escrow_status != EscrowStatus::Held {
            return Err(EscrowError::InvalidState {
                order: order.public_id,
                actual: order.escrow_status,
            });
        }
        Ok(())
    }
}
