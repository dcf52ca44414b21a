use classroom_core::error::{ClassroomError, Result};
use classroom_core::membership::MembershipRepository;
use classroom_core::session::{SessionRepository, SessionRoster};
use std::sync::Arc;

/// Loads a session together with all of its memberships.
#[derive(Clone)]
pub struct RosterLoader {
    sessions: Arc<dyn SessionRepository>,
    memberships: Arc<dyn MembershipRepository>,
}

impl RosterLoader {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        memberships: Arc<dyn MembershipRepository>,
    ) -> Self {
        Self {
            sessions,
            memberships,
        }
    }

    /// # Errors
    ///
    /// `UnknownSession` if no session has the given id.
    pub async fn load(&self, session_id: &str) -> Result<SessionRoster> {
        let session = self
            .sessions
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| ClassroomError::UnknownSession(session_id.to_string()))?;

        let memberships = self.memberships.list_by_session(session_id).await?;

        tracing::debug!(
            "[RosterLoader] Loaded session {} with {} memberships",
            session_id,
            memberships.len()
        );

        Ok(SessionRoster::new(session, memberships))
    }
}
