/// Account store
///
/// Owns registration, credential checks and the list of live sessions of
/// each account. Sits on top of any [`AccountRepository`] and the process
/// [`TokenCodec`].
///
/// # Flow
///
/// ```text
/// create / find_by_credentials ──> TokenCodec::issue ──> add_session
///                                                            │
/// request header ──> resolve_session (parse + listed?) ──────┘
///                                                            │
/// logout ──> remove_session ─────────────────────────────────┘
/// ```
///
/// Every credential or token failure collapses to
/// [`StoreError::Unauthorized`], so callers cannot tell an unknown email
/// from a wrong password, or a forged token from a revoked one.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tasklist_shared::auth::token::TokenCodec;
/// use tasklist_shared::store::{memory::MemoryStore, AccountStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = AccountStore::new(
///     Arc::new(MemoryStore::new()),
///     TokenCodec::new("your-secret-key-at-least-32-bytes"),
/// );
///
/// let account = store.create("a@b.com", "secret123").await?;
/// let token = store.issue_session(account.id).await?;
///
/// let resolved = store.resolve_session(&token).await?;
/// assert_eq!(resolved.id, account.id);
///
/// store.remove_session(account.id, &token).await?;
/// assert!(store.resolve_session(&token).await.is_err());
/// # Ok(())
/// # }
/// ```

use std::sync::{Arc, LazyLock};
use uuid::Uuid;
use validator::Validate;

use super::{AccountRepository, StoreError, StoreResult};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::token::{TokenCodec, AUTH_PURPOSE};
use crate::models::account::{Account, Credentials, SessionRecord};

/// Hash compared against when an email is unknown, so a miss costs one
/// Argon2id verification just like a wrong password
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("tasklist-unknown-account").ok());

/// Hashes on the blocking pool; Argon2id would stall the async worker
async fn hash_blocking(password: &str) -> StoreResult<String> {
    let password = password.to_string();

    let hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| StoreError::Internal(format!("Hashing task failed: {}", e)))??;
    Ok(hash)
}

/// Verifies on the blocking pool; `None` checks against [`DUMMY_HASH`]
async fn verify_blocking(password: &str, hash: Option<&str>) -> StoreResult<bool> {
    let password = password.to_string();
    let hash = hash.map(str::to_string);

    tokio::task::spawn_blocking(move || match hash {
        Some(hash) => verify_password(&password, &hash),
        None => {
            let dummy = DUMMY_HASH.as_deref().unwrap_or_default();
            verify_password(&password, dummy);
            false
        }
    })
    .await
    .map_err(|e| StoreError::Internal(format!("Verification task failed: {}", e)))
}

/// Registration, credentials and sessions
#[derive(Clone)]
pub struct AccountStore {
    repo: Arc<dyn AccountRepository>,
    codec: TokenCodec,
}

impl AccountStore {
    /// Creates a store over `repo`, signing tokens with `codec`
    pub fn new(repo: Arc<dyn AccountRepository>, codec: TokenCodec) -> Self {
        Self { repo, codec }
    }

    /// The token codec used for issuing and parsing
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Registers a new account with no sessions
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if the email is not email-shaped or the password
    ///   is too short
    /// - `Conflict` if the email is already registered
    /// - `Unavailable` if the backend cannot be reached
    pub async fn create(&self, email: &str, password: &str) -> StoreResult<Account> {
        Credentials::new(email, password)
            .validate()
            .map_err(|e| StoreError::ValidationFailed(e.to_string()))?;

        let password_hash = hash_blocking(password).await?;
        let account = self.repo.insert_account(email, &password_hash).await?;

        tracing::info!(account_id = %account.id, "Account created");
        Ok(account)
    }

    /// Looks up an account by email and verifies the password
    ///
    /// # Errors
    ///
    /// `Unauthorized` when the email is unknown or the password is wrong;
    /// the two cases are indistinguishable, in outcome and in time spent.
    pub async fn find_by_credentials(&self, email: &str, password: &str) -> StoreResult<Account> {
        let Some(account) = self.repo.find_by_email(email).await? else {
            verify_blocking(password, None).await?;
            tracing::debug!("Login rejected");
            return Err(StoreError::Unauthorized);
        };

        if !verify_blocking(password, Some(&account.password_hash)).await? {
            tracing::debug!(account_id = %account.id, "Login rejected");
            return Err(StoreError::Unauthorized);
        }

        Ok(account)
    }

    /// Appends `(token, "auth")` to the account's sessions
    pub async fn add_session(&self, account_id: Uuid, token: &str) -> StoreResult<()> {
        self.repo.push_session(account_id, token, AUTH_PURPOSE).await?;

        tracing::debug!(account_id = %account_id, "Session added");
        Ok(())
    }

    /// Issues a fresh token for the account and records it as a live session
    pub async fn issue_session(&self, account_id: Uuid) -> StoreResult<String> {
        let token = self
            .codec
            .issue(account_id)
            .map_err(|e| StoreError::Internal(e.to_string()))?;

        self.add_session(account_id, &token).await?;
        Ok(token)
    }

    /// Resolves a token to the account it was issued to
    ///
    /// The token must carry a valid signature *and* still be listed among
    /// the account's sessions; issuance alone grants nothing.
    ///
    /// # Errors
    ///
    /// `Unauthorized` for malformed, forged, foreign or revoked tokens, and
    /// for tokens naming an account that does not exist. `Unavailable`
    /// propagates unchanged.
    pub async fn resolve_session(&self, token: &str) -> StoreResult<Account> {
        let parsed = self.codec.parse(token).map_err(|e| {
            tracing::debug!(error = %e, "Session token rejected");
            StoreError::Unauthorized
        })?;

        let account = self
            .repo
            .find_by_id(parsed.account_id)
            .await?
            .ok_or(StoreError::Unauthorized)?;

        if !self.repo.has_session(account.id, token).await? {
            tracing::debug!(account_id = %account.id, "Session token not listed");
            return Err(StoreError::Unauthorized);
        }

        Ok(account)
    }

    /// Removes the matching `(token, "auth")` session
    ///
    /// Removing an absent session succeeds; logout is idempotent.
    pub async fn remove_session(&self, account_id: Uuid, token: &str) -> StoreResult<()> {
        let removed = self.repo.pull_session(account_id, token, AUTH_PURPOSE).await?;

        tracing::debug!(account_id = %account_id, removed, "Session removed");
        Ok(())
    }

    /// The account's live sessions, oldest first
    pub async fn sessions(&self, account_id: Uuid) -> StoreResult<Vec<SessionRecord>> {
        self.repo.sessions(account_id).await
    }

    /// Liveness probe of the backing store
    pub async fn ping(&self) -> StoreResult<()> {
        self.repo.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn store() -> AccountStore {
        AccountStore::new(Arc::new(MemoryStore::new()), TokenCodec::new(SECRET))
    }

    #[tokio::test]
    async fn test_create_stores_hash_not_plaintext() {
        let store = store();
        let account = store.create("a@b.com", "secret123").await.unwrap();

        assert_eq!(account.email, "a@b.com");
        assert_ne!(account.password_hash, "secret123");
        assert!(store.sessions(account.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let store = store();

        assert!(matches!(
            store.create("invalid", "secret123").await,
            Err(StoreError::ValidationFailed(_))
        ));
        assert!(matches!(
            store.create("a@b.com", "123").await,
            Err(StoreError::ValidationFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_create_duplicate_email_conflicts() {
        let store = store();
        store.create("a@b.com", "secret123").await.unwrap();

        assert!(matches!(
            store.create("a@b.com", "other-password").await,
            Err(StoreError::Conflict)
        ));
    }

    #[tokio::test]
    async fn test_concurrent_create_exactly_one_wins() {
        let store = store();

        let (first, second) = tokio::join!(
            store.create("race@b.com", "secret123"),
            store.create("race@b.com", "secret456"),
        );

        let outcomes = [first, second];
        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(
            outcomes
                .iter()
                .filter(|r| matches!(r, Err(StoreError::Conflict)))
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn test_find_by_credentials() {
        let store = store();
        let account = store.create("a@b.com", "secret123").await.unwrap();

        let found = store.find_by_credentials("a@b.com", "secret123").await.unwrap();
        assert_eq!(found.id, account.id);

        assert!(matches!(
            store.find_by_credentials("a@b.com", "wrong").await,
            Err(StoreError::Unauthorized)
        ));
        assert!(matches!(
            store.find_by_credentials("nobody@b.com", "secret123").await,
            Err(StoreError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_issued_token_is_useless_until_added() {
        let store = store();
        let account = store.create("a@b.com", "secret123").await.unwrap();

        let token = store.codec().issue(account.id).unwrap();
        assert!(matches!(
            store.resolve_session(&token).await,
            Err(StoreError::Unauthorized)
        ));

        store.add_session(account.id, &token).await.unwrap();
        assert_eq!(store.resolve_session(&token).await.unwrap().id, account.id);
    }

    #[tokio::test]
    async fn test_resolve_rejects_foreign_and_forged_tokens() {
        let store = store();
        let account = store.create("a@b.com", "secret123").await.unwrap();
        store.issue_session(account.id).await.unwrap();

        // Signed by another secret
        let forged = TokenCodec::new("another-secret-key-at-least-32-bytes")
            .issue(account.id)
            .unwrap();
        assert!(matches!(
            store.resolve_session(&forged).await,
            Err(StoreError::Unauthorized)
        ));

        // Valid signature, unknown account
        let orphan = store.codec().issue(Uuid::new_v4()).unwrap();
        assert!(matches!(
            store.resolve_session(&orphan).await,
            Err(StoreError::Unauthorized)
        ));

        assert!(matches!(
            store.resolve_session("garbage").await,
            Err(StoreError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_remove_session_is_idempotent() {
        let store = store();
        let account = store.create("a@b.com", "secret123").await.unwrap();
        let keep = store.issue_session(account.id).await.unwrap();
        let token = store.issue_session(account.id).await.unwrap();

        store.remove_session(account.id, &token).await.unwrap();
        store.remove_session(account.id, &token).await.unwrap();

        assert!(store.resolve_session(&token).await.is_err());
        assert!(store.resolve_session(&keep).await.is_ok());

        let sessions = store.sessions(account.id).await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].token, keep);
        assert_eq!(sessions[0].purpose, AUTH_PURPOSE);
    }

    #[tokio::test]
    async fn test_concurrent_login_and_logout_keep_consistent_sessions() {
        let store = store();
        let account = store.create("a@b.com", "secret123").await.unwrap();
        let existing = store.issue_session(account.id).await.unwrap();

        let (issued, removed) = tokio::join!(
            store.issue_session(account.id),
            store.remove_session(account.id, &existing),
        );
        let issued = issued.unwrap();
        removed.unwrap();

        let tokens: Vec<String> = store
            .sessions(account.id)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.token)
            .collect();
        assert_eq!(tokens, vec![issued]);
    }

    async fn average_login_time(store: &AccountStore, email: &str, password: &str) -> Duration {
        const ROUNDS: u32 = 3;

        let start = Instant::now();
        for _ in 0..ROUNDS {
            assert!(matches!(
                store.find_by_credentials(email, password).await,
                Err(StoreError::Unauthorized)
            ));
        }
        start.elapsed() / ROUNDS
    }

    #[tokio::test]
    async fn test_unknown_email_costs_as_much_as_wrong_password() {
        let store = store();
        store.create("a@b.com", "secret123").await.unwrap();

        // Warm up the dummy hash
        let _ = store.find_by_credentials("warmup@b.com", "secret123").await;

        let wrong_password = average_login_time(&store, "a@b.com", "wrong-password").await;
        let unknown_email = average_login_time(&store, "nobody@b.com", "secret123").await;

        assert!(
            unknown_email * 4 >= wrong_password,
            "unknown email {:?} vs wrong password {:?}",
            unknown_email,
            wrong_password
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_hashing_does_not_stall_the_runtime() {
        let store = store();
        let ticks = Arc::new(AtomicUsize::new(0));

        let ticker = {
            let ticks = ticks.clone();
            tokio::spawn(async move {
                loop {
                    tokio::time::sleep(Duration::from_millis(1)).await;
                    ticks.fetch_add(1, Ordering::Relaxed);
                }
            })
        };

        store.create("a@b.com", "secret123").await.unwrap();
        store.find_by_credentials("a@b.com", "secret123").await.unwrap();
        ticker.abort();

        assert!(ticks.load(Ordering::Relaxed) >= 10);
    }

    struct DownRepository;

    #[async_trait]
    impl AccountRepository for DownRepository {
        async fn insert_account(&self, _: &str, _: &str) -> StoreResult<Account> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
        async fn find_by_email(&self, _: &str) -> StoreResult<Option<Account>> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
        async fn find_by_id(&self, _: Uuid) -> StoreResult<Option<Account>> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
        async fn push_session(&self, _: Uuid, _: &str, _: &str) -> StoreResult<()> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
        async fn pull_session(&self, _: Uuid, _: &str, _: &str) -> StoreResult<bool> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
        async fn has_session(&self, _: Uuid, _: &str) -> StoreResult<bool> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
        async fn sessions(&self, _: Uuid) -> StoreResult<Vec<SessionRecord>> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
        async fn ping(&self) -> StoreResult<()> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_unavailable_store_is_not_unauthorized() {
        let codec = TokenCodec::new(SECRET);
        let token = codec.issue(Uuid::new_v4()).unwrap();
        let store = AccountStore::new(Arc::new(DownRepository), codec);

        assert!(matches!(
            store.resolve_session(&token).await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(matches!(
            store.find_by_credentials("a@b.com", "secret123").await,
            Err(StoreError::Unavailable(_))
        ));
    }
}
