//! Validation errors shared across the domain crates.

use thiserror::Error;

/// A locally detectable bad-input error. These are rejected before any
/// store write or processor call happens.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Currency code is not three ASCII uppercase letters.
    #[error("invalid currency code: '{0}'")]
    InvalidCurrency(String),

    /// Amount must be strictly positive for this operation.
    #[error("amount must be positive, got {0}")]
    NonPositiveAmount(i64),

    /// A required text field was empty after trimming.
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    /// A text field exceeded its maximum length.
    #[error("{field} must be at most {max} characters, got {actual}")]
    FieldTooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
}
