//! Task repository trait.

use super::model::Task;
use crate::error::Result;
use async_trait::async_trait;

/// An abstract repository for graded tasks.
///
/// # Implementation Notes
///
/// `allocate_id` must be atomic per session: N concurrent calls on the same
/// session yield exactly the ids `k+1..=k+N` where `k` is the number of ids
/// handed out before.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Reserves the next sequence id for a task of `session_id`.
    async fn allocate_id(&self, session_id: &str) -> Result<u32>;

    /// Saves a task, replacing any stored task with the same `(session_id, id)`.
    async fn save(&self, task: &Task) -> Result<()>;

    /// Hands `task_id` back when it is still the last id allocated for
    /// `session_id`, so an aborted creation leaves no gap. Any other id is
    /// left consumed.
    async fn release_id(&self, session_id: &str, task_id: u32) -> Result<()>;

    /// Lists tasks of a session ordered by sequence id.
    async fn list_by_session(&self, session_id: &str) -> Result<Vec<Task>>;
}
