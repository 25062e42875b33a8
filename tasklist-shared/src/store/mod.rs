/// Account and task persistence
///
/// The store is split into storage-agnostic repository traits and the
/// services that sit on top of them:
///
/// - [`AccountRepository`] / [`TaskRepository`]: persistence primitives
/// - [`postgres::PgStore`]: PostgreSQL backend (production)
/// - [`memory::MemoryStore`]: in-process backend (tests, local runs)
/// - [`accounts::AccountStore`]: registration, credentials, sessions
/// - [`tasks::TaskStore`]: owner-scoped task CRUD
///
/// # Atomicity
///
/// Every repository method is a single atomic operation in its backend.
/// Email uniqueness is enforced by the backend (a unique constraint in
/// PostgreSQL, the map entry in memory), never by a read-then-write in the
/// services above.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::account::{Account, SessionRecord};
use crate::models::task::{Task, TaskChange};

pub mod accounts;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod tasks;

pub use accounts::AccountStore;
pub use error::{StoreError, StoreResult};
pub use tasks::TaskStore;

/// Persistence primitives for accounts and their sessions
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Inserts a new account, failing with `Conflict` on a duplicate email
    async fn insert_account(&self, email: &str, password_hash: &str) -> StoreResult<Account>;

    /// Finds an account by exact email
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Account>>;

    /// Finds an account by ID
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Account>>;

    /// Appends a session to the account
    async fn push_session(&self, account_id: Uuid, token: &str, purpose: &str) -> StoreResult<()>;

    /// Removes the matching session, returning whether one existed
    async fn pull_session(&self, account_id: Uuid, token: &str, purpose: &str)
        -> StoreResult<bool>;

    /// Whether `token` is listed among the account's sessions
    async fn has_session(&self, account_id: Uuid, token: &str) -> StoreResult<bool>;

    /// The account's sessions, oldest first
    async fn sessions(&self, account_id: Uuid) -> StoreResult<Vec<SessionRecord>>;

    /// Cheap liveness probe
    async fn ping(&self) -> StoreResult<()>;
}

/// Persistence primitives for tasks
///
/// Every lookup is scoped by `owner_id`; a task owned by someone else is
/// indistinguishable from a missing one.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Inserts a new, incomplete task
    async fn insert_task(&self, owner_id: Uuid, text: &str) -> StoreResult<Task>;

    /// All tasks of the owner, oldest first
    async fn list_tasks(&self, owner_id: Uuid) -> StoreResult<Vec<Task>>;

    /// One task of the owner
    async fn find_task(&self, owner_id: Uuid, id: Uuid) -> StoreResult<Option<Task>>;

    /// Writes a resolved change, returning the updated task
    async fn update_task(
        &self,
        owner_id: Uuid,
        id: Uuid,
        change: &TaskChange,
    ) -> StoreResult<Option<Task>>;

    /// Deletes a task, returning it
    async fn delete_task(&self, owner_id: Uuid, id: Uuid) -> StoreResult<Option<Task>>;
}
