//! # souk-api — Axum API for the Souk Back Office
//!
//! HTTP surface over the escrow, ledger, and dispute engines.
//!
//! ## API Surface
//!
//! | Prefix                          | Module               | Domain          |
//! |---------------------------------|----------------------|-----------------|
//! | `/v1/wallet/*`                  | [`routes::wallet`]   | Wallet funding  |
//! | `/v1/orders/:id/escrow/*`       | [`routes::escrow`]   | Escrow actions  |
//! | `/v1/disputes/*`                | [`routes::disputes`] | Dispute lifecycle, messages, timeline |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → AuthMiddleware → Handler
//! ```
//!
//! Health probes (`/health/*`) are mounted outside the auth middleware.

pub mod auth;
pub mod db;
pub mod error;
pub mod extractors;
pub mod openapi;
pub mod routes;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::response::IntoResponse;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Body size limit: 2 MiB, well above the largest legitimate request
/// (a maximum-length dispute message).
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };

    let api = Router::new()
        .merge(routes::wallet::router())
        .merge(routes::escrow::router())
        .merge(routes::disputes::router())
        .merge(openapi::router())
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024))
        .layer(from_fn(auth::auth_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(axum::Extension(auth_config))
        .with_state(state.clone());

    let unauthenticated = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness))
        .with_state(state);

    Router::new().merge(unauthenticated).merge(api)
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — verifies the application is ready to serve traffic.
///
/// Checks that the in-memory stores are readable and, when a database pool
/// is configured, that the database answers `SELECT 1`.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let _ = state.orders.len();
    let _ = state.disputes.len();
    let _ = state.ledger.len();

    if let Some(pool) = &state.db {
        if let Err(e) = sqlx::query("SELECT 1").execute(pool).await {
            tracing::warn!("Database health check failed: {e}");
            return (StatusCode::SERVICE_UNAVAILABLE, "database unreachable").into_response();
        }
    }

    (StatusCode::OK, "ready").into_response()
}
