/// Authentication primitives
///
/// # Modules
///
/// - [`password`]: Argon2id credential hashing and verification
/// - [`token`]: Signed session tokens binding an account id to a purpose tag
/// - [`middleware`]: Per-request gate resolving the session header to an account
///
/// # Example
///
/// ```
/// use tasklist_shared::auth::password::{hash_password, verify_password};
/// use tasklist_shared::auth::token::TokenCodec;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash));
///
/// let codec = TokenCodec::new("a-process-wide-secret-of-32-bytes!");
/// let account_id = Uuid::new_v4();
/// let token = codec.issue(account_id)?;
/// assert_eq!(codec.parse(&token)?.account_id, account_id);
/// # Ok(())
/// # }
/// ```

pub mod middleware;
pub mod password;
pub mod token;

/// Request header carrying the session token, verbatim
pub const SESSION_HEADER: &str = "x-auth";
