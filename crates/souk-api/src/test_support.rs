//! Shared helpers for route tests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use souk_core::{Money, PaymentIntentRef, UserId};
use souk_escrow::OrderRecord;
use souk_ledger::InMemoryProcessor;

use crate::state::{AppConfig, AppState};

pub const TEST_SECRET: &str = "test-secret";

/// In-memory state with auth enabled and a scriptable processor.
pub fn test_state() -> (AppState, Arc<InMemoryProcessor>) {
    let processor = Arc::new(InMemoryProcessor::new());
    let config = AppConfig {
        auth_token: Some(TEST_SECRET.to_string()),
        ..Default::default()
    };
    let state = AppState::with_processor(config, None, processor.clone());
    (state, processor)
}

/// Insert a held order with a registered payment intent.
pub fn seed_order(
    state: &AppState,
    processor: &InMemoryProcessor,
    buyer: UserId,
    seller: UserId,
) -> OrderRecord {
    let intent = PaymentIntentRef::new(format!("pi_{}", uuid::Uuid::new_v4().simple()));
    processor.register_intent(&intent);
    let order = OrderRecord::held(
        buyer,
        seller,
        Money::from_parts(5000, "USD").unwrap(),
        intent,
    );
    state.orders.insert(order.clone());
    order
}

pub fn admin_token() -> String {
    format!("Bearer {TEST_SECRET}")
}

pub fn user_token(role: &str, user: &UserId) -> String {
    format!("Bearer {role}:{}:{TEST_SECRET}", user.as_uuid())
}

pub fn get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::AUTHORIZATION, token)
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, token: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, token)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn post_empty(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, token)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Full application router over the given state.
pub fn test_app(state: AppState) -> Router {
    crate::app(state)
}
