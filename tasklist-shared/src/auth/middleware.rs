/// Authentication middleware for Axum
///
/// Per request the gate moves through
///
/// ```text
/// Unauthenticated ──(x-auth header present)──> TokenExtracted ──> Resolved
///        │                                           │
///        └──────────(header absent)──────> Rejected <┘ (resolve_session failed)
/// ```
///
/// On `Resolved` the middleware inserts an [`AuthSession`] into the request
/// extensions: the account and the exact token used, so logout knows which
/// session to remove. On `Rejected` the request ends with 401 and no
/// downstream handler runs.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Extension, Router};
/// use tasklist_shared::auth::middleware::{require_session, AuthSession};
/// use tasklist_shared::store::AccountStore;
///
/// async fn me(Extension(session): Extension<AuthSession>) -> String {
///     session.account.email
/// }
///
/// fn router(accounts: AccountStore) -> Router {
///     Router::new()
///         .route("/me", get(me))
///         .layer(middleware::from_fn_with_state(accounts, require_session))
/// }
/// ```

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use super::SESSION_HEADER;
use crate::models::account::Account;
use crate::store::{AccountStore, StoreError};

/// Resolved request context
///
/// Immutable; handed to handlers through request extensions.
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// Account the session belongs to
    pub account: Account,

    /// Token string exactly as presented
    pub token: String,
}

/// Error type for authentication middleware
#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    /// Missing, invalid or revoked token
    Unauthorized,

    /// Backing store unreachable
    Unavailable,

    /// Anything else
    Internal,
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unauthorized => AuthError::Unauthorized,
            StoreError::Unavailable(msg) => {
                tracing::error!(error = %msg, "Store unavailable during authentication");
                AuthError::Unavailable
            }
            other => {
                tracing::error!(error = %other, "Authentication failed unexpectedly");
                AuthError::Internal
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AuthError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", "Unauthorized"),
            AuthError::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                "Store unavailable",
            ),
            AuthError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "An internal error occurred",
            ),
        };

        (status, Json(json!({ "error": code, "message": message }))).into_response()
    }
}

/// Reads the session token from the request headers
///
/// Empty or non-ASCII header values count as absent.
pub fn extract_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

/// Resolves request headers to an [`AuthSession`]
pub async fn authenticate(
    accounts: &AccountStore,
    headers: &HeaderMap,
) -> Result<AuthSession, AuthError> {
    let token = extract_token(headers).ok_or(AuthError::Unauthorized)?;
    let account = accounts.resolve_session(token).await?;

    Ok(AuthSession {
        account,
        token: token.to_string(),
    })
}

/// Middleware requiring a live session
///
/// Use with `axum::middleware::from_fn_with_state`.
pub async fn require_session(
    State(accounts): State<AccountStore>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let session = authenticate(&accounts, req.headers()).await?;

    tracing::debug!(account_id = %session.account.id, "Request authenticated");
    req.extensions_mut().insert(session);

    Ok(next.run(req).await)
}
