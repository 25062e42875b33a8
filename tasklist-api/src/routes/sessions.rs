/// Session endpoints
///
/// # Endpoints
///
/// - `POST /sessions` - Login, answering with a fresh session token
/// - `GET /sessions` - Sessions of the current account
/// - `DELETE /sessions` - Logout of the current session only

use super::AccountResponse;
use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tasklist_shared::{
    auth::{middleware::AuthSession, SESSION_HEADER},
    models::account::Credentials,
};

/// One session as shown to its owner
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    /// Purpose tag
    pub purpose: String,

    /// When the session was added
    pub created_at: DateTime<Utc>,

    /// Whether this is the session used for the request
    pub current: bool,
}

/// Session list response
#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    /// Sessions, oldest first
    pub sessions: Vec<SessionView>,
}

/// Login with email and password
///
/// # Endpoint
///
/// ```text
/// POST /sessions
/// Content-Type: application/json
///
/// {
///   "email": "user@example.com",
///   "password": "secret123"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Malformed body
/// - `401 Unauthorized`: Unknown email or wrong password (indistinguishable)
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<([(&'static str, String); 1], Json<AccountResponse>)> {
    let Json(credentials) = payload?;

    let account = state
        .accounts
        .find_by_credentials(&credentials.email, &credentials.password)
        .await?;
    let token = state.accounts.issue_session(account.id).await?;

    tracing::info!(account_id = %account.id, "Session opened");

    Ok(([(SESSION_HEADER, token)], Json(AccountResponse::from(&account))))
}

/// Lists the sessions of the current account without their tokens
pub async fn list(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
) -> ApiResult<Json<SessionListResponse>> {
    let sessions = state
        .accounts
        .sessions(session.account.id)
        .await?
        .into_iter()
        .map(|record| SessionView {
            current: record.token == session.token,
            purpose: record.purpose,
            created_at: record.created_at,
        })
        .collect();

    Ok(Json(SessionListResponse { sessions }))
}

/// Logout
///
/// Removes exactly the session that authenticated this request; other
/// sessions of the account stay valid.
pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
) -> ApiResult<StatusCode> {
    state
        .accounts
        .remove_session(session.account.id, &session.token)
        .await?;

    tracing::info!(account_id = %session.account.id, "Session closed");

    Ok(StatusCode::OK)
}
