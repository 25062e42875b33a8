/// Error kinds surfaced by the account and task stores
///
/// `InvalidToken` from the token codec never escapes the store: it is
/// translated to [`StoreError::Unauthorized`] in
/// [`AccountStore::resolve_session`](super::accounts::AccountStore::resolve_session).

use crate::auth::password::PasswordError;

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Email already registered
    #[error("Email already exists")]
    Conflict,

    /// Bad credentials, or a missing, invalid or revoked token
    #[error("Unauthorized")]
    Unauthorized,

    /// Malformed account or task fields
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// The backing store could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Any other failure (hashing, signing, constraint violations)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation()
                    && db_err.constraint().is_some_and(|c| c.contains("email"))
                {
                    return StoreError::Conflict;
                }
                StoreError::Internal(format!("Database error: {}", db_err))
            }
            sqlx::Error::RowNotFound => StoreError::Internal("Row not found".to_string()),
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}

impl From<PasswordError> for StoreError {
    fn from(err: PasswordError) -> Self {
        StoreError::Internal(err.to_string())
    }
}
