use souk_core::{DisputePublicId, ProcessorDisputeId, ValidationError};
use thiserror::Error;

use crate::status::DisputeStatus;

/// Failures from the dispute subsystem.
#[derive(Debug, Clone, Error)]
pub enum DisputeError {
    /// No dispute is known under the given public id.
    #[error("dispute not found: {0}")]
    NotFound(DisputePublicId),

    /// A dispute already exists for this processor dispute id. The mapping
    /// is one-to-one; a repeated notification is not a new dispute.
    #[error("dispute already exists for processor dispute {0}")]
    DuplicateProcessorDispute(ProcessorDisputeId),

    /// The dispute has resolved; nothing can move it again.
    #[error("dispute {dispute} is {status} and accepts no further transitions")]
    TerminalState {
        dispute: DisputePublicId,
        status: DisputeStatus,
    },

    /// The requested transition is not an edge of the state machine.
    #[error("invalid dispute transition {from} -> {to}")]
    InvalidTransition {
        from: DisputeStatus,
        to: DisputeStatus,
    },

    /// Input failed local validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
