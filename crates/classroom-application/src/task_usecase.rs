//! Task catalog: owner-only creation of graded tasks.

use crate::session::{KeyedLocks, RosterLoader};
use crate::Repositories;
use classroom_core::access::{AUDIT_TARGET, AccessPolicy};
use classroom_core::error::{ClassroomError, ForbiddenReason, Result};
use classroom_core::provision::TestDefinitionWriter;
use classroom_core::task::{Task, TaskRepository, TaskSpec};
use std::sync::Arc;

pub struct TaskUseCase {
    roster_loader: RosterLoader,
    tasks: Arc<dyn TaskRepository>,
    test_writer: Arc<dyn TestDefinitionWriter>,
    /// Per-session lock shared with permission changes
    session_locks: Arc<KeyedLocks<String>>,
}

impl TaskUseCase {
    /// `session_locks` must be the lock table used for ownership changes, so
    /// the owner check and the task write see the same owner.
    pub fn new(
        repositories: &Repositories,
        test_writer: Arc<dyn TestDefinitionWriter>,
        session_locks: Arc<KeyedLocks<String>>,
    ) -> Self {
        Self {
            roster_loader: RosterLoader::new(
                repositories.sessions.clone(),
                repositories.memberships.clone(),
            ),
            tasks: repositories.tasks.clone(),
            test_writer,
            session_locks,
        }
    }

    /// Creates a task in a session owned by `caller`.
    ///
    /// Ids are `1, 2, 3, ...` per session, without gaps or collisions even
    /// when creations race. The test cases are written before the task is
    /// stored; if either step fails the id is handed back and nothing is
    /// stored.
    ///
    /// # Errors
    ///
    /// - `MissingField("cases")` if `spec` carries no test cases
    /// - `UnknownSession` if the session is missing
    /// - `Forbidden(NotOwner)` if `caller` does not own the session
    /// - any error of the test-definition writer or the task repository
    pub async fn create_task(&self, session_id: &str, caller: &str, spec: TaskSpec) -> Result<Task> {
        tracing::debug!(
            "[TaskUseCase] create_task() session={} caller={}",
            session_id,
            caller
        );

        let cases = match spec.cases.as_deref() {
            Some(cases) if !cases.is_empty() => cases.to_vec(),
            _ => return Err(ClassroomError::missing_field("cases")),
        };

        let _guard = self.session_locks.lock(&session_id.to_string()).await;

        let roster = self.roster_loader.load(session_id).await?;
        if !AccessPolicy::can_create_task(&roster, caller) {
            tracing::warn!(
                target: AUDIT_TARGET,
                session_id,
                caller,
                action = "create_task",
                "refused: caller is not the session owner"
            );
            return Err(ClassroomError::forbidden(ForbiddenReason::NotOwner));
        }

        let id = self.tasks.allocate_id(session_id).await?;
        let task = spec.into_task(session_id, id);

        let stored = match self.test_writer.write_cases(session_id, id, &cases).await {
            Ok(()) => self.tasks.save(&task).await,
            Err(e) => Err(e),
        };
        if let Err(e) = stored {
            tracing::error!(
                "[TaskUseCase] Failed to create task {} in session {}: {}",
                id,
                session_id,
                e
            );
            if let Err(release) = self.tasks.release_id(session_id, id).await {
                tracing::warn!(
                    "[TaskUseCase] Could not release task id {} of session {}: {}",
                    id,
                    session_id,
                    release
                );
            }
            return Err(e);
        }

        tracing::info!(
            "[TaskUseCase] {} created task {} ({} cases) in session {}",
            caller,
            id,
            cases.len(),
            session_id
        );

        Ok(task)
    }
}
