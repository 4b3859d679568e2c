//! # Wallet API Routes
//!
//! Funding and balance for the authenticated user's own wallet. The account
//! is always the caller's user id; there is no funding-on-behalf surface.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use souk_core::{Currency, Money};

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::AppState;

/// Request to add funds to the caller's wallet.
///
/// Not a retry-safe intent: every accepted call is a separate deposit.
#[derive(Debug, Deserialize, ToSchema)]
pub struct FundWalletRequest {
    /// Amount in minor units; must be strictly positive.
    pub amount_minor: i64,
    /// Three-letter uppercase currency code, e.g. `USD`.
    pub currency: String,
}

impl Validate for FundWalletRequest {
    fn validate(&self) -> Result<(), String> {
        if self.amount_minor <= 0 {
            return Err(format!(
                "amount_minor must be positive, got {}",
                self.amount_minor
            ));
        }
        Currency::new(self.currency.as_str())
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

/// A committed wallet credit.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FundWalletResponse {
    /// Id of the ledger entry this deposit wrote.
    pub entry_id: Uuid,
    pub account_id: Uuid,
    pub amount_minor: i64,
    pub currency: String,
    /// Derived balance after this deposit.
    pub balance_minor: i64,
}

/// Balance query parameters.
#[derive(Debug, Deserialize, IntoParams)]
pub struct BalanceQuery {
    /// Three-letter uppercase currency code, e.g. `USD`.
    pub currency: String,
}

/// The caller's derived balance in one currency.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BalanceResponse {
    pub account_id: Uuid,
    pub currency: String,
    /// Sum of all ledger entries for this account and currency.
    pub balance_minor: i64,
}

/// Build the wallet router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/wallet/fund", post(fund_wallet))
        .route("/v1/wallet/balance", get(wallet_balance))
}

/// POST /v1/wallet/fund — Add funds to the caller's wallet.
#[utoipa::path(
    post,
    path = "/v1/wallet/fund",
    request_body = FundWalletRequest,
    responses(
        (status = 201, description = "Deposit committed", body = FundWalletResponse),
        (status = 401, description = "Token does not identify a user"),
        (status = 422, description = "Non-positive amount or malformed currency"),
        (status = 502, description = "Processor rejected the payment intent"),
    ),
    tag = "wallet"
)]
async fn fund_wallet(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<FundWalletRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<FundWalletResponse>), AppError> {
    let req = extract_validated_json(body)?;
    let account = caller.require_user()?;
    let amount = Money::from_parts(req.amount_minor, req.currency.as_str())?;
    let currency = amount.currency.clone();

    let entry = state.wallet.fund_wallet(account, amount)?;
    state.persist_ledger_entry(&entry).await;

    Ok((
        StatusCode::CREATED,
        Json(FundWalletResponse {
            entry_id: *entry.id.as_uuid(),
            account_id: *account.as_uuid(),
            amount_minor: entry.amount_minor,
            currency: entry.currency.as_str().to_string(),
            balance_minor: state.wallet.balance(&account, &currency),
        }),
    ))
}

/// GET /v1/wallet/balance — The caller's balance in one currency.
#[utoipa::path(
    get,
    path = "/v1/wallet/balance",
    params(BalanceQuery),
    responses(
        (status = 200, description = "Derived balance", body = BalanceResponse),
        (status = 401, description = "Token does not identify a user"),
        (status = 422, description = "Malformed currency"),
    ),
    tag = "wallet"
)]
async fn wallet_balance(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Query(query): Query<BalanceQuery>,
) -> Result<Json<BalanceResponse>, AppError> {
    let account = caller.require_user()?;
    let currency = Currency::new(query.currency.as_str())?;

    Ok(Json(BalanceResponse {
        account_id: *account.as_uuid(),
        currency: currency.as_str().to_string(),
        balance_minor: state.wallet.balance(&account, &currency),
    }))
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use axum::http::StatusCode;
    use souk_core::UserId;
    use souk_ledger::ProcessorError;
    use tower::ServiceExt;

    #[tokio::test]
    async fn funding_twice_credits_twice() {
        let (state, _processor) = test_state();
        let user = UserId::new();
        let app = test_app(state);
        let token = user_token("buyer", &user);
        let body = serde_json::json!({ "amount_minor": 1000, "currency": "USD" });

        let response = app
            .clone()
            .oneshot(post_json("/v1/wallet/fund", &token, body.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let first = body_json(response).await;
        assert_eq!(first["balance_minor"], 1000);
        assert_eq!(first["account_id"].as_str().unwrap(), user.to_string());

        // Same request again is a second deposit, not a retry.
        let response = app
            .clone()
            .oneshot(post_json("/v1/wallet/fund", &token, body))
            .await
            .unwrap();
        let second = body_json(response).await;
        assert_eq!(second["balance_minor"], 2000);
        assert_ne!(first["entry_id"], second["entry_id"]);

        let response = app
            .oneshot(get("/v1/wallet/balance?currency=USD", &token))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["balance_minor"], 2000);
    }

    #[tokio::test]
    async fn funding_rejects_bad_amounts_and_currencies() {
        let (state, _processor) = test_state();
        let user = UserId::new();
        let app = test_app(state.clone());
        let token = user_token("buyer", &user);

        for body in [
            serde_json::json!({ "amount_minor": 0, "currency": "USD" }),
            serde_json::json!({ "amount_minor": -5, "currency": "USD" }),
            serde_json::json!({ "amount_minor": 100, "currency": "usd" }),
        ] {
            let response = app
                .clone()
                .oneshot(post_json("/v1/wallet/fund", &token, body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        }
        assert!(state.ledger.is_empty());
    }

    #[tokio::test]
    async fn funding_requires_a_user_identity() {
        let (state, _processor) = test_state();
        let app = test_app(state);

        // A bare admin token carries no user id; there is no wallet to fund.
        let response = app
            .oneshot(post_json(
                "/v1/wallet/fund",
                &admin_token(),
                serde_json::json!({ "amount_minor": 100, "currency": "USD" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn processor_failure_leaves_wallet_unchanged() {
        let (state, processor) = test_state();
        let user = UserId::new();
        processor.fail_next(ProcessorError::new("processor", "api_error", "unavailable"));
        let app = test_app(state.clone());
        let token = user_token("buyer", &user);

        let response = app
            .oneshot(post_json(
                "/v1/wallet/fund",
                &token,
                serde_json::json!({ "amount_minor": 900, "currency": "USD" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(state.ledger.is_empty());
    }

    #[tokio::test]
    async fn balance_validates_the_currency() {
        let (state, _processor) = test_state();
        let user = UserId::new();
        let app = test_app(state);

        let response = app
            .oneshot(get(
                "/v1/wallet/balance?currency=dollars",
                &user_token("seller", &user),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
