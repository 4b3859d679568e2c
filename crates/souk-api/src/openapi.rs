//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::state::AppState;

/// Adds the Bearer token security scheme to the OpenAPI spec.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .description(Some(
                            "Bearer token authentication. Set via SOUK_AUTH_TOKEN env var. \
                             Format: {role}:{user_id}:{secret} or bare {secret} (admin).",
                        ))
                        .build(),
                ),
            );
        }
    }
}

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Souk Back Office API",
        version = "0.3.7",
        description = "Escrow, ledger, and dispute-resolution engine for the Souk marketplace.\n\nProvides:\n- **Wallet** funding and derived balances over an append-only ledger\n- **Escrow** release and refund of held order funds (admin)\n- **Dispute** ingestion from the payment processor, status lifecycle, and resolution\n- **Dispute messaging** between parties and support staff\n- **Timeline** reconstruction from the audit log\n\nAuthentication: Bearer token via `Authorization: Bearer <token>` header.\nAll `/v1/*` endpoints require authentication. Health probes (`/health/*`) are unauthenticated.",
        license(name = "Apache-2.0"),
        contact(name = "Souk", url = "https://github.com/souk-market/back-office")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server"),
    ),
    security(
        ("bearer_auth" = [])
    ),
    paths(
        crate::routes::disputes::create_dispute,
        crate::routes::disputes::list_disputes,
        crate::routes::disputes::get_dispute,
        crate::routes::disputes::transition_dispute,
        crate::routes::disputes::list_messages,
        crate::routes::disputes::post_message,
        crate::routes::escrow::release_escrow,
        crate::routes::escrow::refund_escrow,
        crate::routes::wallet::fund_wallet,
        crate::routes::wallet::wallet_balance,
    ),
    components(
        schemas(
            crate::error::ErrorBody,
            crate::error::ErrorDetail,
            crate::routes::disputes::CreateDisputeRequest,
            crate::routes::disputes::TransitionRequest,
            crate::routes::disputes::PostMessageRequest,
            crate::routes::disputes::DisputeResponse,
            crate::routes::disputes::DisputeListResponse,
            crate::routes::disputes::DisputeDetailResponse,
            crate::routes::disputes::OrderSnapshot,
            crate::routes::disputes::MessageResponse,
            crate::routes::disputes::TimelineEventResponse,
            crate::routes::escrow::RefundRequest,
            crate::routes::escrow::EscrowActionResponse,
            crate::routes::wallet::FundWalletRequest,
            crate::routes::wallet::FundWalletResponse,
            crate::routes::wallet::BalanceResponse,
        ),
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "wallet", description = "Wallet funding and derived balances"),
        (name = "escrow", description = "Admin release and refund of held order funds"),
        (name = "disputes", description = "Dispute lifecycle, messaging, and timeline"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router. Serves the spec at `/openapi.json`.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_generates() {
        let spec = ApiDoc::openapi();
        assert_eq!(spec.info.title, "Souk Back Office API");
        assert!(!spec.paths.paths.is_empty());
    }

    #[test]
    fn spec_has_dispute_paths() {
        let spec = ApiDoc::openapi();
        assert!(spec.paths.paths.contains_key("/v1/disputes"));
        assert!(spec.paths.paths.contains_key("/v1/disputes/{id}"));
        assert!(spec.paths.paths.contains_key("/v1/disputes/{id}/messages"));
        assert!(spec
            .paths
            .paths
            .contains_key("/v1/disputes/{id}/transition"));
    }

    #[test]
    fn spec_has_escrow_and_wallet_paths() {
        let spec = ApiDoc::openapi();
        assert!(spec
            .paths
            .paths
            .contains_key("/v1/orders/{public_id}/escrow/release"));
        assert!(spec
            .paths
            .paths
            .contains_key("/v1/orders/{public_id}/escrow/refund"));
        assert!(spec.paths.paths.contains_key("/v1/wallet/fund"));
        assert!(spec.paths.paths.contains_key("/v1/wallet/balance"));
    }

    #[test]
    fn spec_has_security_scheme() {
        let spec = ApiDoc::openapi();
        let components = spec.components.as_ref().unwrap();
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }

    #[test]
    fn spec_serializes_to_json() {
        let json = serde_json::to_string(&ApiDoc::openapi()).unwrap();
        assert!(json.contains("bearer_auth"));
    }
}
