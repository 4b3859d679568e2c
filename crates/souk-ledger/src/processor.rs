//! The external payment-processor boundary.
//!
//! The back office never moves real money itself; it instructs the external
//! processor and records the outcome. This module defines the contract the
//! rest of the system depends on, plus an in-memory implementation used in
//! development and tests.
//!
//! Calls are treated as blocking I/O with a bounded timeout at the transport
//! layer. No caller retries automatically: a failed release or refund is
//! surfaced to the operator, who decides whether retrying is safe.

use std::collections::HashSet;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use souk_core::{Money, PaymentIntentRef};
use thiserror::Error;
use uuid::Uuid;

/// Error code the processor returns when the referenced payment intent no
/// longer exists upstream. This is the unrecoverable sub-case: the record a
/// refund or release would apply against is gone, so no retry can succeed.
pub const RESOURCE_MISSING: &str = "resource_missing";

/// A structured failure from the external processor.
///
/// Carried verbatim to the operator — the error is never swallowed, never
/// retried automatically, and never rewritten into a generic message.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{source_system}: {error_code}: {message}")]
pub struct ProcessorError {
    /// Which upstream system produced the error (e.g. "stripe").
    /// Named `source_system` because thiserror reserves `source`; the wire
    /// field stays `source` per the processor contract.
    #[serde(rename = "source")]
    pub source_system: String,
    /// Machine-readable error code from the processor.
    pub error_code: String,
    /// Human-readable message from the processor.
    pub message: String,
}

impl ProcessorError {
    /// Build a processor error.
    pub fn new(
        source_system: impl Into<String>,
        error_code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source_system: source_system.into(),
            error_code: error_code.into(),
            message: message.into(),
        }
    }

    /// Build the critical-state error for a vanished payment intent.
    pub fn resource_missing(intent: &PaymentIntentRef) -> Self {
        Self::new(
            "processor",
            RESOURCE_MISSING,
            format!("no such payment intent: {intent}"),
        )
    }

    /// Whether this is the critical-state sub-case: the upstream payment
    /// intent has disappeared and manual intervention is required.
    pub fn is_resource_missing(&self) -> bool {
        self.error_code == RESOURCE_MISSING
    }
}

/// Contract with the external payment processor.
///
/// Implementations are synchronous from the caller's point of view; network
/// transports wrap their own timeout. Every method either succeeds or
/// returns a [`ProcessorError`] — there is no partial outcome.
pub trait PaymentProcessor: Send + Sync {
    /// Create a fresh payment intent for the given amount. Called once per
    /// funding request; two calls always yield two distinct references.
    fn create_payment_intent(&self, amount: &Money) -> Result<PaymentIntentRef, ProcessorError>;

    /// Transfer the held funds for this intent to the seller.
    fn release_funds(&self, intent: &PaymentIntentRef) -> Result<(), ProcessorError>;

    /// Refund the held funds for this intent to the buyer.
    fn refund(&self, intent: &PaymentIntentRef, reason: &str) -> Result<(), ProcessorError>;
}

/// In-memory processor used in development mode and tests.
///
/// Tracks which payment intents it has issued; release/refund against an
/// unknown intent fails with [`RESOURCE_MISSING`], mirroring the upstream
/// behavior when a transaction record has been deleted. Failures can be
/// scripted with [`InMemoryProcessor::fail_next`].
#[derive(Default)]
pub struct InMemoryProcessor {
    intents: Mutex<HashSet<String>>,
    scripted_failure: Mutex<Option<ProcessorError>>,
}

impl InMemoryProcessor {
    /// Create an empty in-memory processor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an intent that exists upstream (e.g. one created at checkout
    /// before this process started).
    pub fn register_intent(&self, intent: &PaymentIntentRef) {
        self.intents.lock().insert(intent.as_str().to_string());
    }

    /// Drop an intent, simulating the upstream record disappearing.
    pub fn forget_intent(&self, intent: &PaymentIntentRef) {
        self.intents.lock().remove(intent.as_str());
    }

    /// Script the next call to fail with the given error.
    pub fn fail_next(&self, err: ProcessorError) {
        *self.scripted_failure.lock() = Some(err);
    }

    fn take_scripted_failure(&self) -> Option<ProcessorError> {
        self.scripted_failure.lock().take()
    }
}

impl PaymentProcessor for InMemoryProcessor {
    fn create_payment_intent(&self, amount: &Money) -> Result<PaymentIntentRef, ProcessorError> {
        if let Some(err) = self.take_scripted_failure() {
            return Err(err);
        }
        let intent = PaymentIntentRef::new(format!("pi_{}", Uuid::new_v4().simple()));
        self.intents.lock().insert(intent.as_str().to_string());
        tracing::debug!(intent = %intent, amount = %amount, "created payment intent");
        Ok(intent)
    }

    fn release_funds(&self, intent: &PaymentIntentRef) -> Result<(), ProcessorError> {
        if let Some(err) = self.take_scripted_failure() {
            return Err(err);
        }
        if !self.intents.lock().contains(intent.as_str()) {
            return Err(ProcessorError::resource_missing(intent));
        }
        Ok(())
    }

    fn refund(&self, intent: &PaymentIntentRef, _reason: &str) -> Result<(), ProcessorError> {
        if let Some(err) = self.take_scripted_failure() {
            return Err(err);
        }
        if !self.intents.lock().contains(intent.as_str()) {
            return Err(ProcessorError::resource_missing(intent));
        }
        Ok(())
    }
}
