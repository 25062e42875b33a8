/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `accounts`: Registration and the current account
/// - `sessions`: Login, logout and session listing
/// - `tasks`: Task CRUD scoped to the authenticated account

pub mod accounts;
pub mod health;
pub mod sessions;
pub mod tasks;

use serde::Serialize;
use tasklist_shared::models::account::Account;
use uuid::Uuid;

/// Public view of an account
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    /// Account ID
    pub id: Uuid,

    /// Email address
    pub email: String,
}

impl From<&Account> for AccountResponse {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            email: account.email.clone(),
        }
    }
}
