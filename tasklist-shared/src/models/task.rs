/// Task model and write-time rules
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     owner_id UUID NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
///     text TEXT NOT NULL CHECK (length(text) > 0),
///     completed BOOLEAN NOT NULL DEFAULT FALSE,
///     completed_at BIGINT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp(),
///     CHECK (completed OR completed_at IS NULL)
/// );
/// ```
///
/// # Completion invariant
///
/// `completed_at` is `None` whenever `completed` is false, and is stamped
/// (Unix milliseconds) on every write that sets `completed` to true. The
/// rule is applied by [`TaskPatch::resolve`]; callers never supply
/// `completed_at` themselves.
///
/// # Example
///
/// ```
/// use tasklist_shared::models::task::TaskPatch;
///
/// let change = TaskPatch { text: None, completed: Some(true) }.resolve(1_700_000_000_000);
/// assert!(change.completed);
/// assert_eq!(change.completed_at, Some(1_700_000_000_000));
///
/// let change = TaskPatch { text: None, completed: Some(false) }.resolve(1_700_000_000_000);
/// assert_eq!(change.completed_at, None);
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A task owned by exactly one account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Owning account, immutable after creation
    pub owner_id: Uuid,

    /// Task text, never empty
    pub text: String,

    /// Whether the task is done
    pub completed: bool,

    /// Completion time in Unix milliseconds, `None` unless completed
    pub completed_at: Option<i64>,

    /// When the task was created
    pub created_at: DateTime<Utc>,
}

/// Caller-supplied changes to a task
///
/// Only `text` and `completed` are honoured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    /// New text
    pub text: Option<String>,

    /// New completion flag
    pub completed: Option<bool>,
}

/// Fully-resolved update, ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskChange {
    /// New text, `None` keeps the current text
    pub text: Option<String>,

    /// Completion flag to store
    pub completed: bool,

    /// Completion stamp to store
    pub completed_at: Option<i64>,
}

impl TaskPatch {
    /// Applies the completion invariant
    ///
    /// `completed: Some(true)` stamps `now_ms`; anything else (including an
    /// absent flag) marks the task incomplete and clears the stamp.
    pub fn resolve(self, now_ms: i64) -> TaskChange {
        let completed = self.completed == Some(true);

        TaskChange {
            text: self.text,
            completed,
            completed_at: completed.then_some(now_ms),
        }
    }
}

/// Trims task text and rejects empty values
pub fn normalize_text(text: &str) -> Result<String, String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err("Task text must not be empty".to_string());
    }

    Ok(trimmed.to_string())
}

/// Current time in Unix milliseconds, as stored in `completed_at`
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_stamps_time() {
        let change = TaskPatch {
            text: Some("Changed text".to_string()),
            completed: Some(true),
        }
        .resolve(434_253_445);

        assert_eq!(change.text.as_deref(), Some("Changed text"));
        assert!(change.completed);
        assert_eq!(change.completed_at, Some(434_253_445));
    }

    #[test]
    fn test_incomplete_clears_time() {
        let change = TaskPatch {
            text: None,
            completed: Some(false),
        }
        .resolve(10);

        assert!(!change.completed);
        assert_eq!(change.completed_at, None);
    }

    #[test]
    fn test_absent_flag_marks_incomplete() {
        let change = TaskPatch {
            text: Some("only text".to_string()),
            completed: None,
        }
        .resolve(10);

        assert!(!change.completed);
        assert_eq!(change.completed_at, None);
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  buy milk ").unwrap(), "buy milk");
        assert!(normalize_text("").is_err());
        assert!(normalize_text("   ").is_err());
    }

    #[test]
    fn test_task_serializes_camel_case() {
        let task = Task {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            text: "x".to_string(),
            completed: false,
            completed_at: None,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&task).unwrap();
        assert!(json.get("ownerId").is_some());
        assert!(json["completedAt"].is_null());
    }
}
