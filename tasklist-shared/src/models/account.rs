/// Account model
///
/// # Schema
///
/// ```sql
/// CREATE TABLE accounts (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email TEXT NOT NULL,
///     password_hash TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT accounts_email_key UNIQUE (email)
/// );
///
/// CREATE TABLE sessions (
///     token TEXT PRIMARY KEY,
///     account_id UUID NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
///     purpose TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()
/// );
/// ```
///
/// Email comparison is case-sensitive, exactly as stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A registered identity
///
/// `password_hash` is an Argon2id PHC string. It is skipped on
/// serialization and redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Account {
    /// Unique account ID, immutable
    pub id: Uuid,

    /// Email address, unique across all accounts
    pub email: String,

    /// Argon2id credential hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// When the account was registered
    pub created_at: DateTime<Utc>,
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// One currently-valid session of an account
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct SessionRecord {
    /// Token string exactly as issued
    pub token: String,

    /// Purpose tag (`"auth"`)
    pub purpose: String,

    /// When the session was added
    pub created_at: DateTime<Utc>,
}

/// Email and plaintext password as submitted by a client
///
/// Validation rules apply to registration only; login just compares.
#[derive(Clone, Deserialize, Validate)]
pub struct Credentials {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Plaintext password, never logged
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

impl Credentials {
    /// Builds credentials from borrowed parts
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}
