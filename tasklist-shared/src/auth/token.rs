/// Session token codec
///
/// Tokens are compact HS256 JWTs binding an account id to the purpose tag
/// `"auth"`. The signing secret is process-wide configuration, read once at
/// startup; rotating it invalidates every previously issued token.
///
/// A token only proves that *this process* signed it. Whether the session is
/// still live is decided by the account store, which keeps the list of
/// tokens that have not been logged out.
///
/// # Claims
///
/// - `sub`: Account ID
/// - `purpose`: Always `"auth"`
/// - `iat`: Issued at (Unix timestamp)
/// - `jti`: Random token ID, so two logins in the same second never collide
///
/// Tokens carry no `exp` claim: sessions end at logout.
///
/// # Example
///
/// ```
/// use tasklist_shared::auth::token::{TokenCodec, AUTH_PURPOSE};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let codec = TokenCodec::new("your-secret-key-at-least-32-bytes");
/// let account_id = Uuid::new_v4();
///
/// let token = codec.issue(account_id)?;
/// let parsed = codec.parse(&token)?;
///
/// assert_eq!(parsed.account_id, account_id);
/// assert_eq!(parsed.purpose, AUTH_PURPOSE);
/// # Ok(())
/// # }
/// ```

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Purpose tag carried by every session token
pub const AUTH_PURPOSE: &str = "auth";

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Failed to sign a token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Signature mismatch, malformed payload, or unexpected purpose
    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

/// Claims embedded in a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - Account ID
    pub sub: Uuid,

    /// Purpose tag
    pub purpose: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Token ID
    pub jti: Uuid,
}

impl Claims {
    /// Creates claims for a fresh auth session
    pub fn new(account_id: Uuid) -> Self {
        Self {
            sub: account_id,
            purpose: AUTH_PURPOSE.to_string(),
            iat: Utc::now().timestamp(),
            jti: Uuid::new_v4(),
        }
    }
}

/// Identity decoded from a verified token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedToken {
    /// Account the token was issued to
    pub account_id: Uuid,

    /// Purpose tag (always [`AUTH_PURPOSE`] once parsed)
    pub purpose: String,
}

/// Issues and parses signed session tokens
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &Algorithm::HS256)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Creates a codec signing with the given secret
    ///
    /// The secret should be at least 32 bytes; the API config enforces this.
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Issues a token for `account_id` with the `"auth"` purpose
    ///
    /// # Errors
    ///
    /// Returns `TokenError::CreateError` if signing fails
    pub fn issue(&self, account_id: Uuid) -> Result<String, TokenError> {
        self.encode(&Claims::new(account_id))
    }

    /// Signs arbitrary claims
    pub fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| TokenError::CreateError(format!("Token encoding failed: {}", e)))
    }

    /// Verifies the signature and decodes the embedded identity
    ///
    /// Never panics on attacker-supplied input; every failure is
    /// `TokenError::InvalidToken`.
    pub fn parse(&self, token: &str) -> Result<ParsedToken, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| TokenError::InvalidToken(e.to_string()))?;

        if data.claims.purpose != AUTH_PURPOSE {
            return Err(TokenError::InvalidToken(format!(
                "unexpected purpose '{}'",
                data.claims.purpose
            )));
        }

        Ok(ParsedToken {
            account_id: data.claims.sub,
            purpose: data.claims.purpose,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_issue_and_parse() {
        let codec = TokenCodec::new(SECRET);
        let account_id = Uuid::new_v4();

        let token = codec.issue(account_id).expect("Issue should succeed");
        let parsed = codec.parse(&token).expect("Parse should succeed");

        assert_eq!(parsed.account_id, account_id);
        assert_eq!(parsed.purpose, AUTH_PURPOSE);
    }

    #[test]
    fn test_tokens_are_fresh_per_issue() {
        let codec = TokenCodec::new(SECRET);
        let account_id = Uuid::new_v4();

        let first = codec.issue(account_id).unwrap();
        let second = codec.issue(account_id).unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_encoding_is_deterministic_for_same_claims() {
        let codec = TokenCodec::new(SECRET);
        let claims = Claims::new(Uuid::new_v4());

        assert_eq!(codec.encode(&claims).unwrap(), codec.encode(&claims).unwrap());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = TokenCodec::new(SECRET).issue(Uuid::new_v4()).unwrap();
        let other = TokenCodec::new("a-completely-different-32-byte-secret");

        assert!(matches!(other.parse(&token), Err(TokenError::InvalidToken(_))));
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let codec = TokenCodec::new(SECRET);
        let token = codec.issue(Uuid::new_v4()).unwrap();
        let forged_payload = codec.issue(Uuid::new_v4()).unwrap();

        // Splice another token's payload under the original signature
        let parts: Vec<&str> = token.split('.').collect();
        let forged: Vec<&str> = forged_payload.split('.').collect();
        let spliced = format!("{}.{}.{}", parts[0], forged[1], parts[2]);

        assert!(matches!(codec.parse(&spliced), Err(TokenError::InvalidToken(_))));
    }

    #[test]
    fn test_unexpected_purpose_is_rejected() {
        let codec = TokenCodec::new(SECRET);
        let mut claims = Claims::new(Uuid::new_v4());
        claims.purpose = "reset".to_string();

        let token = codec.encode(&claims).unwrap();
        let err = codec.parse(&token).unwrap_err();

        assert!(err.to_string().contains("unexpected purpose"));
    }

    #[test]
    fn test_missing_purpose_is_rejected() {
        #[derive(Serialize)]
        struct NoPurpose {
            sub: Uuid,
            iat: i64,
        }

        let token = encode(
            &Header::new(Algorithm::HS256),
            &NoPurpose { sub: Uuid::new_v4(), iat: 0 },
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let codec = TokenCodec::new(SECRET);
        assert!(matches!(codec.parse(&token), Err(TokenError::InvalidToken(_))));
    }

    #[test]
    fn test_garbage_input_is_rejected() {
        let codec = TokenCodec::new(SECRET);

        for input in ["", "abc", "a.b.c", "....", "not-a-jwt-at-all", "\u{0}\u{ff}"] {
            assert!(
                matches!(codec.parse(input), Err(TokenError::InvalidToken(_))),
                "input {:?} should be rejected",
                input
            );
        }
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let codec = TokenCodec::new(SECRET);
        assert!(!format!("{:?}", codec).contains(SECRET));
    }
}
