//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps domain errors from souk-ledger, souk-escrow, and souk-dispute to
//! HTTP status codes and JSON error bodies with code, message, and details.
//! Internal error details never reach clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use souk_core::OrderPublicId;
use souk_dispute::DisputeError;
use souk_escrow::EscrowError;
use souk_ledger::{LedgerError, ProcessorError};
use thiserror::Error;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses use this format. The `details` field carries
/// additional context for processor failures and validation errors but is
/// omitted for 500-class errors to prevent information leakage.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "PROCESSOR_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details, present only for client-actionable errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request body could not be parsed or contains invalid values (422).
    /// Normalized with `Validation`: the client sent syntactically valid
    /// HTTP but semantically invalid content.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Authentication failure — missing or invalid token (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authorization failure — insufficient permissions (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Conflict with current resource state — a terminal dispute, a
    /// non-held escrow, a duplicate processor dispute id (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The external payment processor rejected an operation (502), or —
    /// when `critical` — reported that the payment intent no longer exists
    /// upstream, making the operation permanently un-completable (409).
    /// The structured error is surfaced verbatim in `details` so the
    /// operator can act on it.
    #[error("processor error on order {order:?}: {err}")]
    Processor {
        order: Option<OrderPublicId>,
        err: ProcessorError,
        critical: bool,
    },

    /// Internal server error (500). Message is logged but not returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// The HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::UNPROCESSABLE_ENTITY, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::Processor { critical: true, .. } => {
                (StatusCode::CONFLICT, "PROCESSOR_STATE_CRITICAL")
            }
            Self::Processor { .. } => (StatusCode::BAD_GATEWAY, "PROCESSOR_ERROR"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let (message, details) = match &self {
            Self::Internal(_) => ("An internal error occurred".to_string(), None),
            Self::Processor {
                order,
                err,
                critical,
            } => {
                let message = if *critical {
                    "The payment record no longer exists at the processor; \
                     manual intervention is required"
                        .to_string()
                } else {
                    "The payment processor rejected the operation".to_string()
                };
                let details = serde_json::json!({
                    "source": err.source_system,
                    "error_code": err.error_code,
                    "message": err.message,
                    "affected_order_public_id": order.map(|o| o.to_string()),
                    "critical": critical,
                });
                (message, Some(details))
            }
            other => (other.to_string(), None),
        };

        match &self {
            Self::Internal(_) => tracing::error!(error = %self, "internal server error"),
            Self::Processor { critical: true, .. } => {
                tracing::error!(error = %self, "processor critical state")
            }
            Self::Processor { .. } => tracing::error!(error = %self, "processor error"),
            _ => {}
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<souk_core::ValidationError> for AppError {
    fn from(err: souk_core::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Validation(e) => Self::Validation(e.to_string()),
            // Funding failures have no order context; criticality does not
            // apply to creating a fresh intent.
            LedgerError::Processor(e) => Self::Processor {
                order: None,
                err: e,
                critical: false,
            },
        }
    }
}

impl From<EscrowError> for AppError {
    fn from(err: EscrowError) -> Self {
        match err {
            EscrowError::NotFound(id) => Self::NotFound(format!("order not found: {id}")),
            EscrowError::InvalidState { .. } => Self::Conflict(err.to_string()),
            EscrowError::Processor { order, err } => Self::Processor {
                order: Some(order),
                err,
                critical: false,
            },
            EscrowError::CriticalState { order, err } => Self::Processor {
                order: Some(order),
                err,
                critical: true,
            },
        }
    }
}

impl From<DisputeError> for AppError {
    fn from(err: DisputeError) -> Self {
        match err {
            DisputeError::NotFound(id) => Self::NotFound(format!("dispute not found: {id}")),
            DisputeError::DuplicateProcessorDispute(_)
            | DisputeError::TerminalState { .. }
            | DisputeError::InvalidTransition { .. } => Self::Conflict(err.to_string()),
            DisputeError::Validation(e) => Self::Validation(e.to_string()),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::Internal(format!("database error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use souk_core::PaymentIntentRef;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn critical_processor_error_is_409_with_full_details() {
        let order = OrderPublicId::new();
        let err = AppError::from(EscrowError::CriticalState {
            order,
            err: ProcessorError::resource_missing(&PaymentIntentRef::new("pi_gone")),
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "PROCESSOR_STATE_CRITICAL");
        let details = &json["error"]["details"];
        assert_eq!(details["error_code"], "resource_missing");
        assert_eq!(details["critical"], true);
        assert_eq!(
            details["affected_order_public_id"].as_str().unwrap(),
            order.to_string()
        );
    }

    #[tokio::test]
    async fn generic_processor_error_is_502() {
        let err = AppError::from(EscrowError::Processor {
            order: OrderPublicId::new(),
            err: ProcessorError::new("stripe", "api_error", "timeout"),
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "PROCESSOR_ERROR");
        assert_eq!(json["error"]["details"]["source"], "stripe");
        assert_eq!(json["error"]["details"]["critical"], false);
    }

    #[tokio::test]
    async fn invariant_violations_are_409_conflict() {
        let terminal = AppError::from(DisputeError::TerminalState {
            dispute: souk_core::DisputePublicId::new(),
            status: souk_dispute::DisputeStatus::Won,
        });
        assert_eq!(terminal.into_response().status(), StatusCode::CONFLICT);

        let held = AppError::from(EscrowError::InvalidState {
            order: OrderPublicId::new(),
            actual: souk_escrow::EscrowStatus::Released,
        });
        assert_eq!(held.into_response().status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn internal_error_hides_message() {
        let response = AppError::Internal("secret connection string".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert!(!json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("secret"));
    }
}
