//! # Authentication Middleware
//!
//! Bearer token middleware that resolves the caller's role and user id.
//!
//! ## Token Format
//!
//! ```text
//! Bearer {role}:{user_id}:{secret}   — standard format
//! Bearer {secret}                    — legacy format (treated as admin)
//! ```
//!
//! The role is one of `buyer`, `seller`, `support`, `admin`; `user_id` may
//! be empty for staff tokens. Every authenticated request gets a
//! [`CallerIdentity`] injected into the request extensions, and handlers
//! extract it via `FromRequestParts`. All identity-sensitive decisions
//! (message sender, wallet account, escrow authorization) read this
//! identity and never trust identity fields in request content.

use axum::extract::Request;
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use souk_core::{ActorRole, UserId};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::error::{AppError, ErrorBody, ErrorDetail};

/// Identity of the authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    /// The role the caller authenticated under.
    pub role: ActorRole,
    /// The caller's user id. `None` only for staff tokens without a user
    /// binding (legacy tokens, service accounts).
    pub user_id: Option<UserId>,
}

impl CallerIdentity {
    /// The caller's user id, required for operations that act as a user
    /// (posting a message, funding a wallet).
    pub fn require_user(&self) -> Result<UserId, AppError> {
        self.user_id
            .ok_or_else(|| AppError::Unauthorized("token does not identify a user".into()))
    }

    /// The actor id recorded in audit entries for this caller.
    pub fn audit_actor(&self) -> String {
        match self.user_id {
            Some(id) => id.to_string(),
            None => self.role.as_str().to_string(),
        }
    }
}

#[axum::async_trait]
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for CallerIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("no caller identity in request context".into()))
    }
}

/// Check that the caller is an admin. Escrow release/refund and dispute
/// ingestion/transition are admin-only.
pub fn require_admin(caller: &CallerIdentity) -> Result<(), AppError> {
    if caller.role == ActorRole::Admin {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "admin role required, caller has '{}'",
            caller.role.as_str()
        )))
    }
}

/// Check that the caller is staff (admin or support).
pub fn require_staff(caller: &CallerIdentity) -> Result<(), AppError> {
    if caller.role.is_staff() {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "staff role required, caller has '{}'",
            caller.role.as_str()
        )))
    }
}

/// Auth configuration injected into request extensions.
///
/// Custom `Debug` redacts the token value so it cannot leak into logs.
#[derive(Clone)]
pub struct AuthConfig {
    pub token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Constant-time comparison of bearer tokens.
///
/// When lengths differ, performs a dummy comparison to avoid leaking length
/// information through timing variance.
fn constant_time_token_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

/// Parse a bearer token in format `{role}:{user_id}:{secret}` or `{secret}`
/// (legacy, treated as admin).
pub fn parse_bearer_token(provided: &str, expected_secret: &str) -> Result<CallerIdentity, String> {
    let parts: Vec<&str> = provided.splitn(3, ':').collect();

    match parts.len() {
        1 => {
            if constant_time_token_eq(provided, expected_secret) {
                Ok(CallerIdentity {
                    role: ActorRole::Admin,
                    user_id: None,
                })
            } else {
                Err("invalid bearer token".into())
            }
        }
        3 => {
            let role_str = parts[0];
            let user_str = parts[1];
            let secret = parts[2];

            if !constant_time_token_eq(secret, expected_secret) {
                return Err("invalid bearer token".into());
            }

            let role = match role_str {
                "buyer" => ActorRole::Buyer,
                "seller" => ActorRole::Seller,
                "support" => ActorRole::Support,
                "admin" => ActorRole::Admin,
                other => return Err(format!("unknown role: {other}")),
            };

            let user_id = if user_str.is_empty() {
                None
            } else {
                Some(
                    user_str
                        .parse::<Uuid>()
                        .map(UserId::from_uuid)
                        .map_err(|e| format!("invalid user_id: {e}"))?,
                )
            };

            // Buyer and seller tokens act as a specific user; a role-only
            // token makes no sense for them.
            if user_id.is_none() && !role.is_staff() {
                return Err(format!("role '{}' requires a user_id", role.as_str()));
            }

            Ok(CallerIdentity { role, user_id })
        }
        _ => Err("invalid token format — expected {role}:{user_id}:{secret} or {secret}".into()),
    }
}

/// Extract and validate the Bearer token from the Authorization header and
/// inject the resulting [`CallerIdentity`] into request extensions.
///
/// When `AuthConfig.token` is `None`, all requests are allowed with an
/// admin identity (auth disabled / development mode).
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let expected_token = request.extensions().get::<AuthConfig>().cloned();

    match expected_token {
        Some(AuthConfig {
            token: Some(ref expected),
        }) => {
            let auth_header = request
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok());

            match auth_header {
                Some(header_value) if header_value.starts_with("Bearer ") => {
                    let provided = &header_value[7..];
                    match parse_bearer_token(provided, expected) {
                        Ok(identity) => {
                            request.extensions_mut().insert(identity);
                            next.run(request).await
                        }
                        Err(msg) => {
                            tracing::warn!(reason = %msg, "authentication failed: invalid bearer token");
                            unauthorized_response(&msg)
                        }
                    }
                }
                Some(_) => {
                    tracing::warn!("authentication failed: non-Bearer authorization scheme");
                    unauthorized_response("authorization header must use Bearer scheme")
                }
                None => {
                    tracing::warn!("authentication failed: missing authorization header");
                    unauthorized_response("missing authorization header")
                }
            }
        }
        _ => {
            // Auth disabled — inject an admin identity for full access.
            request.extensions_mut().insert(CallerIdentity {
                role: ActorRole::Admin,
                user_id: None,
            });
            next.run(request).await
        }
    }
}

fn unauthorized_response(message: &str) -> Response {
    let body = ErrorBody {
        error: ErrorDetail {
            code: "UNAUTHORIZED".to_string(),
            message: message.to_string(),
            details: None,
        },
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}
