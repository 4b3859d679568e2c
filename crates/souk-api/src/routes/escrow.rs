//! # Escrow API Routes
//!
//! Admin-only release and refund of held order funds. Each call commits at
//! most one escrow transition; every attempt, successful or not, lands in
//! the audit log so the dispute timeline can show it.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use souk_core::OrderPublicId;
use souk_dispute::AuditLogEntry;
use souk_escrow::{EscrowError, EscrowOutcome};

use crate::auth::{require_admin, CallerIdentity};
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::AppState;

/// Request to refund held funds to the buyer.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RefundRequest {
    /// Operator-supplied reason, forwarded to the processor.
    pub reason: String,
}

impl Validate for RefundRequest {
    fn validate(&self) -> Result<(), String> {
        if self.reason.trim().is_empty() {
            return Err("reason must not be empty".into());
        }
        Ok(())
    }
}

/// The order after a committed escrow transition. Public fields only.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EscrowActionResponse {
    /// Public order id.
    pub id: Uuid,
    pub escrow_status: String,
    pub amount_minor: i64,
    pub currency: String,
    pub hold_start_at: DateTime<Utc>,
    pub escrow_held_at: DateTime<Utc>,
}

/// Build the escrow router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/orders/:public_id/escrow/release", post(release_escrow))
        .route("/v1/orders/:public_id/escrow/refund", post(refund_escrow))
}

fn outcome_to_response(outcome: &EscrowOutcome) -> EscrowActionResponse {
    EscrowActionResponse {
        id: *outcome.order.public_id.as_uuid(),
        escrow_status: outcome.order.escrow_status.as_str().to_string(),
        amount_minor: outcome.order.total.amount_minor,
        currency: outcome.order.total.currency.as_str().to_string(),
        hold_start_at: outcome.order.hold_start_at,
        escrow_held_at: outcome.order.escrow_held_at,
    }
}

/// Persist the outcome and record the success audit entry.
///
/// The audit target is the order's internal id, which is how the timeline
/// reconstructor joins escrow actions back to a dispute.
async fn commit_outcome(
    state: &AppState,
    caller: &CallerIdentity,
    action: &str,
    outcome: &EscrowOutcome,
) {
    state
        .record_audit(AuditLogEntry::new(
            caller.audit_actor(),
            action,
            outcome.order.id.to_string(),
            serde_json::json!({
                "amount_minor": outcome.entry.amount_minor,
                "currency": outcome.entry.currency.as_str(),
                "entry_type": outcome.entry.entry_type.as_str(),
            }),
        ))
        .await;
    state.persist_order(&outcome.order).await;
    state.persist_ledger_entry(&outcome.entry).await;
}

/// Record the failure in the audit log when the order exists. Not-found and
/// precondition failures are not audited; processor failures are, since the
/// timeline must show them.
///
/// The dispute timeline serves the audited error to the order's buyer and
/// seller, so only the processor's source and error code are recorded,
/// never its message, which can embed the payment-intent reference.
async fn audit_failure(
    state: &AppState,
    caller: &CallerIdentity,
    action: &str,
    public_id: &OrderPublicId,
    err: &EscrowError,
) {
    let (EscrowError::Processor { err: cause, .. }
    | EscrowError::CriticalState { err: cause, .. }) = err
    else {
        return;
    };
    let Some(order) = state.orders.get_by_public(public_id) else {
        return;
    };
    state
        .record_audit(
            AuditLogEntry::new(
                caller.audit_actor(),
                action,
                order.id.to_string(),
                serde_json::Value::Null,
            )
            .with_error(format!("{}: {}", cause.source_system, cause.error_code)),
        )
        .await;
}

/// POST /v1/orders/:public_id/escrow/release — Release held funds to the
/// seller.
#[utoipa::path(
    post,
    path = "/v1/orders/{public_id}/escrow/release",
    params(("public_id" = Uuid, Path, description = "Public order id")),
    responses(
        (status = 200, description = "Escrow released", body = EscrowActionResponse),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Escrow is not held, or the payment record vanished upstream"),
        (status = 502, description = "Processor rejected the transfer; retryable"),
    ),
    tag = "escrow"
)]
async fn release_escrow(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(public_id): Path<Uuid>,
) -> Result<Json<EscrowActionResponse>, AppError> {
    require_admin(&caller)?;
    let public_id = OrderPublicId::from_uuid(public_id);

    match state.escrow.release(&public_id) {
        Ok(outcome) => {
            commit_outcome(&state, &caller, "ESCROW_RELEASED", &outcome).await;
            Ok(Json(outcome_to_response(&outcome)))
        }
        Err(err) => {
            audit_failure(&state, &caller, "ESCROW_RELEASE_FAILED", &public_id, &err).await;
            Err(err.into())
        }
    }
}

/// POST /v1/orders/:public_id/escrow/refund — Refund held funds to the
/// buyer.
#[utoipa::path(
    post,
    path = "/v1/orders/{public_id}/escrow/refund",
    params(("public_id" = Uuid, Path, description = "Public order id")),
    request_body = RefundRequest,
    responses(
        (status = 200, description = "Escrow refunded", body = EscrowActionResponse),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Escrow is not held, or the payment record vanished upstream"),
        (status = 422, description = "Missing refund reason"),
        (status = 502, description = "Processor rejected the refund; retryable"),
    ),
    tag = "escrow"
)]
async fn refund_escrow(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(public_id): Path<Uuid>,
    body: Result<Json<RefundRequest>, JsonRejection>,
) -> Result<Json<EscrowActionResponse>, AppError> {
    require_admin(&caller)?;
    let req = extract_validated_json(body)?;
    let public_id = OrderPublicId::from_uuid(public_id);

    match state.escrow.refund(&public_id, req.reason.trim()) {
        Ok(outcome) => {
            commit_outcome(&state, &caller, "ESCROW_REFUNDED", &outcome).await;
            Ok(Json(outcome_to_response(&outcome)))
        }
        Err(err) => {
            audit_failure(&state, &caller, "ESCROW_REFUND_FAILED", &public_id, &err).await;
            Err(err.into())
        }
    }
}
