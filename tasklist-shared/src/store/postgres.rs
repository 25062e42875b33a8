/// PostgreSQL store backend
///
/// Every method is one SQL statement, so atomicity comes from PostgreSQL:
///
/// - Duplicate emails are rejected by the `accounts_email_key` unique
///   constraint and surface as [`StoreError::Conflict`].
/// - Sessions live in their own table keyed by token, so login and logout
///   on the same account are independent single-row writes.
/// - Task updates are a single `UPDATE ... RETURNING` filtered by owner.
///
/// # Example
///
/// ```no_run
/// use tasklist_shared::db::pool::{create_pool, DatabaseConfig};
/// use tasklist_shared::store::{postgres::PgStore, AccountRepository};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig {
///     url: std::env::var("DATABASE_URL")?,
///     ..Default::default()
/// })
/// .await?;
///
/// let store = PgStore::new(pool);
/// let found = store.find_by_email("a@b.com").await?;
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{AccountRepository, StoreResult, TaskRepository};
use crate::models::account::{Account, SessionRecord};
use crate::models::task::{Task, TaskChange};

const ACCOUNT_COLUMNS: &str = "id, email, password_hash, created_at";
const TASK_COLUMNS: &str = "id, owner_id, text, completed, completed_at, created_at";

/// PostgreSQL implementation of both repositories
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wraps an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl AccountRepository for PgStore {
    async fn insert_account(&self, email: &str, password_hash: &str) -> StoreResult<Account> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "INSERT INTO accounts (email, password_hash) VALUES ($1, $2) RETURNING {}",
            ACCOUNT_COLUMNS
        ))
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(account)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {} FROM accounts WHERE email = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {} FROM accounts WHERE id = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    async fn push_session(&self, account_id: Uuid, token: &str, purpose: &str) -> StoreResult<()> {
        sqlx::query("INSERT INTO sessions (token, account_id, purpose) VALUES ($1, $2, $3)")
            .bind(token)
            .bind(account_id)
            .bind(purpose)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn pull_session(
        &self,
        account_id: Uuid,
        token: &str,
        purpose: &str,
    ) -> StoreResult<bool> {
        let result = sqlx::query(
            "DELETE FROM sessions WHERE token = $1 AND account_id = $2 AND purpose = $3",
        )
        .bind(token)
        .bind(account_id)
        .bind(purpose)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn has_session(&self, account_id: Uuid, token: &str) -> StoreResult<bool> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM sessions WHERE token = $1 AND account_id = $2)",
        )
        .bind(token)
        .bind(account_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn sessions(&self, account_id: Uuid) -> StoreResult<Vec<SessionRecord>> {
        let sessions = sqlx::query_as::<_, SessionRecord>(
            r#"
            SELECT token, purpose, created_at
            FROM sessions
            WHERE account_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sessions)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for PgStore {
    async fn insert_task(&self, owner_id: Uuid, text: &str) -> StoreResult<Task> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks (owner_id, text) VALUES ($1, $2) RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(owner_id)
        .bind(text)
        .fetch_one(&self.pool)
        .await?;

        Ok(task)
    }

    async fn list_tasks(&self, owner_id: Uuid) -> StoreResult<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE owner_id = $1 ORDER BY created_at ASC",
            TASK_COLUMNS
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }

    async fn find_task(&self, owner_id: Uuid, id: Uuid) -> StoreResult<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE id = $1 AND owner_id = $2",
            TASK_COLUMNS
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    async fn update_task(
        &self,
        owner_id: Uuid,
        id: Uuid,
        change: &TaskChange,
    ) -> StoreResult<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks
            SET text = COALESCE($3, text),
                completed = $4,
                completed_at = $5
            WHERE id = $1 AND owner_id = $2
            RETURNING {}
            "#,
            TASK_COLUMNS
        ))
        .bind(id)
        .bind(owner_id)
        .bind(change.text.as_deref())
        .bind(change.completed)
        .bind(change.completed_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    async fn delete_task(&self, owner_id: Uuid, id: Uuid) -> StoreResult<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "DELETE FROM tasks WHERE id = $1 AND owner_id = $2 RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }
}
