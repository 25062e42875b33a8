/// Owner-scoped task store
///
/// Every method takes the owner ID from the resolved request context, never
/// from client input. Updates go through [`TaskPatch::resolve`], so the
/// completion invariant holds regardless of what the client sent.

use std::sync::Arc;
use uuid::Uuid;

use super::{StoreError, StoreResult, TaskRepository};
use crate::models::task::{normalize_text, now_millis, Task, TaskPatch};

/// Task CRUD for one backend
#[derive(Clone)]
pub struct TaskStore {
    repo: Arc<dyn TaskRepository>,
}

impl TaskStore {
    /// Creates a store over `repo`
    pub fn new(repo: Arc<dyn TaskRepository>) -> Self {
        Self { repo }
    }

    /// Creates an incomplete task owned by `owner_id`
    pub async fn create(&self, owner_id: Uuid, text: &str) -> StoreResult<Task> {
        let text = normalize_text(text).map_err(StoreError::ValidationFailed)?;
        let task = self.repo.insert_task(owner_id, &text).await?;

        tracing::debug!(task_id = %task.id, owner_id = %owner_id, "Task created");
        Ok(task)
    }

    /// All tasks of the owner
    pub async fn list(&self, owner_id: Uuid) -> StoreResult<Vec<Task>> {
        self.repo.list_tasks(owner_id).await
    }

    /// One task of the owner
    pub async fn get(&self, owner_id: Uuid, id: Uuid) -> StoreResult<Option<Task>> {
        self.repo.find_task(owner_id, id).await
    }

    /// Applies a patch, stamping or clearing `completed_at`
    pub async fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        mut patch: TaskPatch,
    ) -> StoreResult<Option<Task>> {
        if let Some(text) = patch.text.as_deref() {
            patch.text = Some(normalize_text(text).map_err(StoreError::ValidationFailed)?);
        }

        let change = patch.resolve(now_millis());
        self.repo.update_task(owner_id, id, &change).await
    }

    /// Deletes a task of the owner, returning it
    pub async fn delete(&self, owner_id: Uuid, id: Uuid) -> StoreResult<Option<Task>> {
        let task = self.repo.delete_task(owner_id, id).await?;

        if task.is_some() {
            tracing::debug!(task_id = %id, owner_id = %owner_id, "Task deleted");
        }
        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use crate::store::AccountRepository;

    async fn setup() -> (TaskStore, Uuid, Uuid) {
        let backend = MemoryStore::new();
        let alice = backend.insert_account("alice@example.com", "h").await.unwrap();
        let bob = backend.insert_account("bob@example.com", "h").await.unwrap();

        (TaskStore::new(Arc::new(backend)), alice.id, bob.id)
    }

    #[tokio::test]
    async fn test_create_defaults_to_incomplete() {
        let (tasks, alice, _) = setup().await;
        let task = tasks.create(alice, "  Test todo text ").await.unwrap();

        assert_eq!(task.text, "Test todo text");
        assert_eq!(task.owner_id, alice);
        assert!(!task.completed);
        assert!(task.completed_at.is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_empty_text() {
        let (tasks, alice, _) = setup().await;

        assert!(matches!(
            tasks.create(alice, "   ").await,
            Err(StoreError::ValidationFailed(_))
        ));
        assert!(tasks.list(alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_enforces_completion_invariant() {
        let (tasks, alice, _) = setup().await;
        let task = tasks.create(alice, "First").await.unwrap();

        let done = tasks
            .update(
                alice,
                task.id,
                TaskPatch {
                    text: Some("Changed text".to_string()),
                    completed: Some(true),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(done.text, "Changed text");
        assert!(done.completed);
        assert!(done.completed_at.is_some());

        let undone = tasks
            .update(
                alice,
                task.id,
                TaskPatch {
                    text: None,
                    completed: Some(false),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(undone.text, "Changed text");
        assert!(!undone.completed);
        assert!(undone.completed_at.is_none());
    }

    #[tokio::test]
    async fn test_other_owner_sees_nothing() {
        let (tasks, alice, bob) = setup().await;
        let task = tasks.create(alice, "private").await.unwrap();

        assert!(tasks.get(bob, task.id).await.unwrap().is_none());
        assert!(tasks
            .update(bob, task.id, TaskPatch::default())
            .await
            .unwrap()
            .is_none());
        assert!(tasks.delete(bob, task.id).await.unwrap().is_none());
        assert!(tasks.get(alice, task.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_returns_task_once() {
        let (tasks, alice, _) = setup().await;
        let task = tasks.create(alice, "gone").await.unwrap();

        assert_eq!(tasks.delete(alice, task.id).await.unwrap().unwrap().id, task.id);
        assert!(tasks.delete(alice, task.id).await.unwrap().is_none());
    }
}
