//! # Dispute API Routes
//!
//! HTTP surface for the dispute lifecycle: ingesting processor chargeback
//! notifications, listing and inspecting disputes, driving status
//! transitions, and the per-dispute message channel.
//!
//! ## Sanitization
//!
//! Responses never carry internal ids, processor dispute ids, or
//! payment-intent references. The dispute's internal order reference is
//! translated to the order's public id; a dispute whose order is missing
//! renders `order_id`/`order_snapshot` as null rather than failing.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use souk_core::{ActorRole, DisputePublicId, OrderPublicId, ProcessorDisputeId, UserId};
use souk_dispute::{
    reconstruct_timeline, resolve_access, validate_body, AuditLogEntry, Dispute, DisputeMessage,
    DisputeStatus, TimelineEvent,
};
use souk_escrow::OrderRecord;

use crate::auth::{require_admin, require_staff, CallerIdentity};
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

/// Request to record a processor-reported dispute against an order.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateDisputeRequest {
    /// The processor's dispute id. Globally unique.
    pub processor_dispute_id: String,
    /// Public id of the disputed order.
    pub order_id: Uuid,
    /// Processor-supplied reason code.
    pub reason: String,
    /// Evidence submission deadline, if the processor set one.
    pub evidence_due_by: Option<DateTime<Utc>>,
}

impl Validate for CreateDisputeRequest {
    fn validate(&self) -> Result<(), String> {
        if self.processor_dispute_id.trim().is_empty() {
            return Err("processor_dispute_id must not be empty".into());
        }
        if self.reason.trim().is_empty() {
            return Err("reason must not be empty".into());
        }
        Ok(())
    }
}

/// Request to move a dispute to a new status.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TransitionRequest {
    /// Target status name, e.g. `"WON"`.
    pub status: String,
}

impl Validate for TransitionRequest {
    fn validate(&self) -> Result<(), String> {
        DisputeStatus::parse(&self.status)
            .map(|_| ())
            .ok_or_else(|| format!("unknown dispute status: '{}'", self.status))
    }
}

/// Request to post a message to a dispute's channel.
///
/// Deliberately carries only the body: sender identity comes from the
/// authenticated caller, and any extra fields a client sends are ignored.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PostMessageRequest {
    pub message_body: String,
}

impl Validate for PostMessageRequest {
    fn validate(&self) -> Result<(), String> {
        validate_body(&self.message_body)
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

/// A dispute as clients see it.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DisputeResponse {
    /// Public dispute id.
    pub id: Uuid,
    /// Public id of the disputed order; null when the order is unknown.
    pub order_id: Option<Uuid>,
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    pub status: String,
    pub reason: String,
    pub amount_minor: i64,
    pub currency: String,
    pub evidence_due_by: Option<DateTime<Utc>>,
    pub valid_transitions: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public fields of the disputed order, embedded in the detail response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderSnapshot {
    pub id: Uuid,
    pub escrow_status: String,
    pub amount_minor: i64,
    pub currency: String,
    pub hold_start_at: DateTime<Utc>,
    pub escrow_held_at: DateTime<Utc>,
}

/// One message in a dispute channel.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub id: Uuid,
    pub dispute_id: Uuid,
    pub sender_role: String,
    pub sender_id: Uuid,
    pub message_body: String,
    pub created_at: DateTime<Utc>,
}

/// One reconstructed timeline event.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TimelineEventResponse {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// `SYSTEM` or `ADMIN`.
    pub actor: String,
    pub action: String,
    pub message: Option<String>,
    pub metadata: serde_json::Value,
}

/// Full dispute detail: the sanitized record, the order snapshot (or null),
/// the newest-first timeline, and the oldest-first messages.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DisputeDetailResponse {
    pub dispute: DisputeResponse,
    pub order_snapshot: Option<OrderSnapshot>,
    pub timeline: Vec<TimelineEventResponse>,
    pub messages: Vec<MessageResponse>,
}

/// Paginated dispute list.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DisputeListResponse {
    pub disputes: Vec<DisputeResponse>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

/// Filters for the dispute list.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListDisputesQuery {
    /// Page size; default 50, capped at 200.
    pub limit: Option<usize>,
    /// Number of disputes to skip.
    pub offset: Option<usize>,
    /// Filter by status name, e.g. `NEEDS_RESPONSE`.
    pub status: Option<String>,
    /// Filter by the disputed order's public id.
    pub order_id: Option<Uuid>,
}

const DEFAULT_PAGE_SIZE: usize = 50;
const MAX_PAGE_SIZE: usize = 200;

// ---------------------------------------------------------------------------

/// Build the dispute router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/disputes", post(create_dispute).get(list_disputes))
        .route("/v1/disputes/:id", get(get_dispute))
        .route("/v1/disputes/:id/transition", post(transition_dispute))
        .route(
            "/v1/disputes/:id/messages",
            get(list_messages).post(post_message),
        )
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn dispute_to_response(state: &AppState, dispute: &Dispute) -> DisputeResponse {
    // Internal order reference -> public id; null when the order is gone.
    let order_public = state
        .orders
        .get(&dispute.order_id)
        .map(|o| *o.public_id.as_uuid());

    DisputeResponse {
        id: *dispute.public_id.as_uuid(),
        order_id: order_public,
        buyer_id: *dispute.buyer_id.as_uuid(),
        seller_id: *dispute.seller_id.as_uuid(),
        status: dispute.status.as_str().to_string(),
        reason: dispute.reason.clone(),
        amount_minor: dispute.amount.amount_minor,
        currency: dispute.amount.currency.as_str().to_string(),
        evidence_due_by: dispute.evidence_due_by,
        valid_transitions: dispute
            .status
            .valid_transitions()
            .iter()
            .map(|s| s.as_str().to_string())
            .collect(),
        created_at: dispute.created_at,
        updated_at: dispute.updated_at,
    }
}

fn order_snapshot(order: &OrderRecord) -> OrderSnapshot {
    OrderSnapshot {
        id: *order.public_id.as_uuid(),
        escrow_status: order.escrow_status.as_str().to_string(),
        amount_minor: order.total.amount_minor,
        currency: order.total.currency.as_str().to_string(),
        hold_start_at: order.hold_start_at,
        escrow_held_at: order.escrow_held_at,
    }
}

fn message_to_response(message: &DisputeMessage) -> MessageResponse {
    MessageResponse {
        id: *message.id.as_uuid(),
        dispute_id: *message.dispute_id.as_uuid(),
        sender_role: message.sender_role.as_str().to_string(),
        sender_id: *message.sender_id.as_uuid(),
        message_body: message.body.clone(),
        created_at: message.created_at,
    }
}

fn timeline_to_response(event: TimelineEvent) -> TimelineEventResponse {
    TimelineEventResponse {
        id: event.id,
        timestamp: event.timestamp,
        actor: match event.actor {
            souk_dispute::TimelineActor::System => "SYSTEM".to_string(),
            souk_dispute::TimelineActor::Admin => "ADMIN".to_string(),
        },
        action: event.action,
        message: event.message,
        metadata: event.metadata,
    }
}

/// Fetch the dispute and check the caller may read it. 404 when missing,
/// 403 when present but out of the caller's reach.
fn readable_dispute(
    state: &AppState,
    id: Uuid,
    caller: &CallerIdentity,
) -> Result<Dispute, AppError> {
    let public_id = DisputePublicId::from_uuid(id);
    let dispute = state
        .disputes
        .get_by_public(&public_id)
        .ok_or_else(|| AppError::NotFound(format!("dispute not found: {public_id}")))?;

    let caller_user = caller.user_id.unwrap_or_else(|| UserId::from_uuid(Uuid::nil()));
    let access = resolve_access(&dispute, &caller_user, caller.role);
    if !access.can_read() {
        return Err(AppError::Forbidden(
            "caller has no access to this dispute".into(),
        ));
    }
    Ok(dispute)
}

/// The role a message is attributed to: party membership wins over the
/// role claimed at authentication time; staff keep their staff role.
fn sender_role(dispute: &Dispute, caller: &CallerIdentity, sender: &UserId) -> ActorRole {
    if &dispute.buyer_id == sender {
        ActorRole::Buyer
    } else if &dispute.seller_id == sender {
        ActorRole::Seller
    } else {
        caller.role
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /v1/disputes — Record a processor-reported dispute.
#[utoipa::path(
    post,
    path = "/v1/disputes",
    request_body = CreateDisputeRequest,
    responses(
        (status = 201, description = "Dispute recorded", body = DisputeResponse),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Dispute already exists for this processor dispute id"),
        (status = 422, description = "Validation error"),
    ),
    tag = "disputes"
)]
async fn create_dispute(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<CreateDisputeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<DisputeResponse>), AppError> {
    require_admin(&caller)?;
    let req = extract_validated_json(body)?;

    let order_public = OrderPublicId::from_uuid(req.order_id);
    let order = state
        .orders
        .get_by_public(&order_public)
        .ok_or_else(|| AppError::NotFound(format!("order not found: {order_public}")))?;

    let dispute = Dispute::open(
        ProcessorDisputeId::new(req.processor_dispute_id),
        order.payment_intent_ref.clone(),
        order.id,
        order.buyer_id,
        order.seller_id,
        order.total.clone(),
        req.reason,
        req.evidence_due_by,
    );
    let dispute = state.disputes.create(dispute)?;
    state.persist_dispute(&dispute).await;

    Ok((
        StatusCode::CREATED,
        Json(dispute_to_response(&state, &dispute)),
    ))
}

/// GET /v1/disputes — List disputes (staff only).
#[utoipa::path(
    get,
    path = "/v1/disputes",
    params(ListDisputesQuery),
    responses(
        (status = 200, description = "Paginated dispute list", body = DisputeListResponse),
        (status = 403, description = "Caller is not staff"),
        (status = 422, description = "Unknown status filter"),
    ),
    tag = "disputes"
)]
async fn list_disputes(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Query(query): Query<ListDisputesQuery>,
) -> Result<Json<DisputeListResponse>, AppError> {
    require_staff(&caller)?;

    let status_filter = query
        .status
        .as_deref()
        .map(|s| {
            DisputeStatus::parse(s)
                .ok_or_else(|| AppError::Validation(format!("unknown dispute status: '{s}'")))
        })
        .transpose()?;
    // The order filter takes the public id only; internal ids are not an
    // accepted query surface.
    let order_filter = query.order_id.map(OrderPublicId::from_uuid);

    let matches: Vec<Dispute> = state
        .disputes
        .list()
        .into_iter()
        .filter(|d| status_filter.map_or(true, |s| d.status == s))
        .filter(|d| match order_filter {
            None => true,
            Some(public) => state
                .orders
                .get(&d.order_id)
                .is_some_and(|o| o.public_id == public),
        })
        .collect();

    let total = matches.len();
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0);
    let disputes = matches
        .iter()
        .skip(offset)
        .take(limit)
        .map(|d| dispute_to_response(&state, d))
        .collect();

    Ok(Json(DisputeListResponse {
        disputes,
        total,
        limit,
        offset,
    }))
}

/// GET /v1/disputes/:id — Dispute detail with snapshot, timeline, messages.
#[utoipa::path(
    get,
    path = "/v1/disputes/{id}",
    params(("id" = Uuid, Path, description = "Public dispute id")),
    responses(
        (status = 200, description = "Dispute detail", body = DisputeDetailResponse),
        (status = 403, description = "Caller has no access to this dispute"),
        (status = 404, description = "Dispute not found"),
    ),
    tag = "disputes"
)]
async fn get_dispute(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<DisputeDetailResponse>, AppError> {
    let dispute = readable_dispute(&state, id, &caller)?;

    // Missing order is a null snapshot, never an error.
    let snapshot = state
        .orders
        .get(&dispute.order_id)
        .map(|o| order_snapshot(&o));

    let timeline = reconstruct_timeline(&dispute, &state.audit)
        .into_iter()
        .map(timeline_to_response)
        .collect();

    let messages = state
        .messages
        .list(&dispute.public_id)
        .iter()
        .map(message_to_response)
        .collect();

    Ok(Json(DisputeDetailResponse {
        dispute: dispute_to_response(&state, &dispute),
        order_snapshot: snapshot,
        timeline,
        messages,
    }))
}

/// POST /v1/disputes/:id/transition — Move a dispute to a new status.
#[utoipa::path(
    post,
    path = "/v1/disputes/{id}/transition",
    params(("id" = Uuid, Path, description = "Public dispute id")),
    request_body = TransitionRequest,
    responses(
        (status = 200, description = "Dispute transitioned", body = DisputeResponse),
        (status = 404, description = "Dispute not found"),
        (status = 409, description = "Dispute is terminal or the transition is invalid"),
    ),
    tag = "disputes"
)]
async fn transition_dispute(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    body: Result<Json<TransitionRequest>, JsonRejection>,
) -> Result<Json<DisputeResponse>, AppError> {
    require_admin(&caller)?;
    let req = extract_validated_json(body)?;
    let Some(target) = DisputeStatus::parse(&req.status) else {
        return Err(AppError::Validation(format!(
            "unknown dispute status: '{}'",
            req.status
        )));
    };

    let public_id = DisputePublicId::from_uuid(id);
    let before = state
        .disputes
        .get_by_public(&public_id)
        .ok_or_else(|| AppError::NotFound(format!("dispute not found: {public_id}")))?;
    let dispute = state.disputes.transition(&public_id, target)?;

    state
        .record_audit(AuditLogEntry::new(
            caller.audit_actor(),
            "DISPUTE_STATUS_CHANGED",
            dispute.public_id.to_string(),
            serde_json::json!({
                "from": before.status.as_str(),
                "to": dispute.status.as_str(),
            }),
        ))
        .await;
    state.persist_dispute(&dispute).await;

    Ok(Json(dispute_to_response(&state, &dispute)))
}

/// GET /v1/disputes/:id/messages — List messages, oldest first.
#[utoipa::path(
    get,
    path = "/v1/disputes/{id}/messages",
    params(("id" = Uuid, Path, description = "Public dispute id")),
    responses(
        (status = 200, description = "Messages in ascending creation order", body = [MessageResponse]),
        (status = 403, description = "Caller has no access to this dispute"),
        (status = 404, description = "Dispute not found"),
    ),
    tag = "disputes"
)]
async fn list_messages(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<MessageResponse>>, AppError> {
    let dispute = readable_dispute(&state, id, &caller)?;
    let messages = state
        .messages
        .list(&dispute.public_id)
        .iter()
        .map(message_to_response)
        .collect();
    Ok(Json(messages))
}

/// POST /v1/disputes/:id/messages — Post a message.
///
/// Succeeds in every dispute status, terminal ones included. Posting needs
/// a user-bound token: every message is attributed to a concrete sender id,
/// so the legacy bare-secret token can read the channel but not write to it.
#[utoipa::path(
    post,
    path = "/v1/disputes/{id}/messages",
    params(("id" = Uuid, Path, description = "Public dispute id")),
    request_body = PostMessageRequest,
    responses(
        (status = 201, description = "Message posted", body = MessageResponse),
        (status = 401, description = "Token does not identify a user"),
        (status = 403, description = "Caller has no access to this dispute"),
        (status = 404, description = "Dispute not found"),
        (status = 422, description = "Empty or oversized message body"),
    ),
    tag = "disputes"
)]
async fn post_message(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    body: Result<Json<PostMessageRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let req = extract_validated_json(body)?;
    let dispute = readable_dispute(&state, id, &caller)?;

    let sender = caller.require_user()?;
    let role = sender_role(&dispute, &caller, &sender);
    let body = validate_body(&req.message_body)?;

    let message = state.messages.post(dispute.public_id, role, sender, body);
    state.persist_message(&message).await;

    Ok((StatusCode::CREATED, Json(message_to_response(&message))))
}
