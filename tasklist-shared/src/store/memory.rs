/// In-process store backend
///
/// Holds accounts, sessions and tasks behind a single `tokio` lock. Every
/// trait method takes the lock once for its whole read-modify-write, which
/// gives the same guarantees as the per-row atomic statements of
/// [`PgStore`](super::postgres::PgStore): a duplicate email never wins twice
/// and concurrent login/logout on one account never lose an update.
///
/// Used by the test suites and by `STORE_BACKEND=memory`.
///
/// # Example
///
/// ```
/// use tasklist_shared::store::{memory::MemoryStore, AccountRepository};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// store.insert_account("a@b.com", "$argon2id$...").await?;
/// assert!(store.find_by_email("a@b.com").await?.is_some());
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AccountRepository, StoreError, StoreResult, TaskRepository};
use crate::models::account::{Account, SessionRecord};
use crate::models::task::{Task, TaskChange};

#[derive(Debug)]
struct AccountEntry {
    account: Account,
    sessions: Vec<SessionRecord>,
}

#[derive(Debug, Default)]
struct State {
    accounts: HashMap<Uuid, AccountEntry>,
    emails: HashMap<String, Uuid>,
    tasks: Vec<Task>,
}

/// In-memory implementation of both repositories
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountRepository for MemoryStore {
    async fn insert_account(&self, email: &str, password_hash: &str) -> StoreResult<Account> {
        let mut state = self.state.write().await;

        if state.emails.contains_key(email) {
            return Err(StoreError::Conflict);
        }

        let account = Account {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };

        state.emails.insert(account.email.clone(), account.id);
        state.accounts.insert(
            account.id,
            AccountEntry {
                account: account.clone(),
                sessions: Vec::new(),
            },
        );

        Ok(account)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let state = self.state.read().await;

        Ok(state
            .emails
            .get(email)
            .and_then(|id| state.accounts.get(id))
            .map(|entry| entry.account.clone()))
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Account>> {
        let state = self.state.read().await;
        Ok(state.accounts.get(&id).map(|entry| entry.account.clone()))
    }

    async fn push_session(&self, account_id: Uuid, token: &str, purpose: &str) -> StoreResult<()> {
        let mut state = self.state.write().await;

        let token_taken = state
            .accounts
            .values()
            .any(|entry| entry.sessions.iter().any(|s| s.token == token));
        if token_taken {
            return Err(StoreError::Internal("Session token already in use".to_string()));
        }

        let entry = state
            .accounts
            .get_mut(&account_id)
            .ok_or_else(|| StoreError::Internal(format!("Unknown account {}", account_id)))?;

        entry.sessions.push(SessionRecord {
            token: token.to_string(),
            purpose: purpose.to_string(),
            created_at: Utc::now(),
        });

        Ok(())
    }

    async fn pull_session(
        &self,
        account_id: Uuid,
        token: &str,
        purpose: &str,
    ) -> StoreResult<bool> {
        let mut state = self.state.write().await;

        let Some(entry) = state.accounts.get_mut(&account_id) else {
            return Ok(false);
        };

        let before = entry.sessions.len();
        entry
            .sessions
            .retain(|s| !(s.token == token && s.purpose == purpose));

        Ok(entry.sessions.len() < before)
    }

    async fn has_session(&self, account_id: Uuid, token: &str) -> StoreResult<bool> {
        let state = self.state.read().await;

        Ok(state
            .accounts
            .get(&account_id)
            .is_some_and(|entry| entry.sessions.iter().any(|s| s.token == token)))
    }

    async fn sessions(&self, account_id: Uuid) -> StoreResult<Vec<SessionRecord>> {
        let state = self.state.read().await;

        Ok(state
            .accounts
            .get(&account_id)
            .map(|entry| entry.sessions.clone())
            .unwrap_or_default())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for MemoryStore {
    async fn insert_task(&self, owner_id: Uuid, text: &str) -> StoreResult<Task> {
        let mut state = self.state.write().await;

        if !state.accounts.contains_key(&owner_id) {
            return Err(StoreError::Internal(format!("Unknown account {}", owner_id)));
        }

        let task = Task {
            id: Uuid::new_v4(),
            owner_id,
            text: text.to_string(),
            completed: false,
            completed_at: None,
            created_at: Utc::now(),
        };
        state.tasks.push(task.clone());

        Ok(task)
    }

    async fn list_tasks(&self, owner_id: Uuid) -> StoreResult<Vec<Task>> {
        let state = self.state.read().await;

        Ok(state
            .tasks
            .iter()
            .filter(|t| t.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn find_task(&self, owner_id: Uuid, id: Uuid) -> StoreResult<Option<Task>> {
        let state = self.state.read().await;

        Ok(state
            .tasks
            .iter()
            .find(|t| t.id == id && t.owner_id == owner_id)
            .cloned())
    }

    async fn update_task(
        &self,
        owner_id: Uuid,
        id: Uuid,
        change: &TaskChange,
    ) -> StoreResult<Option<Task>> {
        let mut state = self.state.write().await;

        let Some(task) = state
            .tasks
            .iter_mut()
            .find(|t| t.id == id && t.owner_id == owner_id)
        else {
            return Ok(None);
        };

        if let Some(text) = &change.text {
            task.text = text.clone();
        }
        task.completed = change.completed;
        task.completed_at = change.completed_at;

        Ok(Some(task.clone()))
    }

    async fn delete_task(&self, owner_id: Uuid, id: Uuid) -> StoreResult<Option<Task>> {
        let mut state = self.state.write().await;

        let position = state
            .tasks
            .iter()
            .position(|t| t.id == id && t.owner_id == owner_id);

        Ok(position.map(|index| state.tasks.remove(index)))
    }
}
