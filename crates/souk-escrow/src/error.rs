use souk_core::OrderPublicId;
use souk_ledger::ProcessorError;
use thiserror::Error;

use crate::order::EscrowStatus;

/// Failures from the escrow controller.
#[derive(Debug, Clone, Error)]
pub enum EscrowError {
    /// No order is known under the given public id.
    #[error("order not found: {0}")]
    NotFound(OrderPublicId),

    /// The order is not in `HELD`, so neither release nor refund applies.
    /// This is how the losing side of a release/refund race learns it lost.
    #[error("order {order} escrow is {actual}, expected HELD")]
    InvalidState {
        order: OrderPublicId,
        actual: EscrowStatus,
    },

    /// The processor rejected the operation. Local state is unchanged and
    /// the operation may be retried once the upstream issue clears.
    #[error("processor rejected escrow operation on order {order}: {err}")]
    Processor {
        order: OrderPublicId,
        err: ProcessorError,
    },

    /// The processor reports the payment intent no longer exists. Retrying
    /// cannot succeed; the order needs manual intervention.
    #[error("order {order} escrow is in a critical state: {err}")]
    CriticalState {
        order: OrderPublicId,
        err: ProcessorError,
    },
}

impl EscrowError {
    /// Classify a processor failure: `resource_missing` is the unrecoverable
    /// critical sub-case, everything else is retryable.
    pub fn from_processor(order: OrderPublicId, err: ProcessorError) -> Self {
        if err.is_resource_missing() {
            Self::CriticalState { order, err }
        } else {
            Self::Processor { order, err }
        }
    }
}
