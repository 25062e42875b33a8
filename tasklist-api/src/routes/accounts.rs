/// Account endpoints
///
/// # Endpoints
///
/// - `POST /accounts` - Register, answering with a session token
/// - `GET /accounts/me` - Current account

use super::AccountResponse;
use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use tasklist_shared::{
    auth::{middleware::AuthSession, SESSION_HEADER},
    models::account::Credentials,
};
use validator::Validate;

/// Register a new account
///
/// # Endpoint
///
/// ```text
/// POST /accounts
/// Content-Type: application/json
///
/// {
///   "email": "user@example.com",
///   "password": "secret123"
/// }
/// ```
///
/// # Response
///
/// `200 OK` with an `x-auth` header carrying the new session token:
///
/// ```json
/// {
///   "id": "uuid",
///   "email": "user@example.com"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Malformed body or validation failed
/// - `409 Conflict`: Email already exists
/// - `500 Internal Server Error`: Server error
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<([(&'static str, String); 1], Json<AccountResponse>)> {
    let Json(credentials) = payload?;
    credentials.validate()?;

    let account = state
        .accounts
        .create(&credentials.email, &credentials.password)
        .await?;
    let token = state.accounts.issue_session(account.id).await?;

    tracing::info!(account_id = %account.id, "Account registered");

    Ok(([(SESSION_HEADER, token)], Json(AccountResponse::from(&account))))
}

/// Returns the account behind the current session
pub async fn me(Extension(session): Extension<AuthSession>) -> Json<AccountResponse> {
    Json(AccountResponse::from(&session.account))
}
