//! Ledger and wallet error types.

use thiserror::Error;

use crate::processor::ProcessorError;

/// Errors from ledger and wallet operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Bad input rejected before any processor call or store write.
    #[error(transparent)]
    Validation(#[from] souk_core::ValidationError),

    /// The external processor rejected or failed the funding step. No ledger
    /// entry is written when this occurs — funding is all-or-nothing.
    #[error("payment processor error: {0}")]
    Processor(#[from] ProcessorError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use souk_core::ValidationError;

    #[test]
    fn validation_errors_pass_through() {
        let err = LedgerError::from(ValidationError::NonPositiveAmount(0));
        assert!(err.to_string().contains("positive"));
    }

    #[test]
    fn processor_errors_carry_detail() {
        let err = LedgerError::from(ProcessorError::new(
            "processor",
            "card_declined",
            "the card was declined",
        ));
        assert!(err.to_string().contains("card_declined"));
    }
}
