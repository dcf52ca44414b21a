//! Session catalog: creation and the per-user session views.

use crate::session::{KeyedLocks, RosterLoader};
use crate::Repositories;
use classroom_core::access::AccessPolicy;
use classroom_core::error::{ClassroomError, Result};
use classroom_core::membership::{Membership, MembershipRepository, Role};
use classroom_core::provision::{ProvisioningEvent, ProvisioningSink};
use classroom_core::session::{Privacy, Session, SessionRepository, SessionSummary};
use classroom_core::user::UserRepository;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Input of [`SessionUseCase::create_session`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    pub sname: Option<String>,
    pub privacy: Option<Privacy>,
    pub description: Option<String>,
    pub hidden: Option<bool>,
}

/// A session the user has joined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinedSession {
    #[serde(flatten)]
    pub summary: SessionSummary,
    pub role: Role,
    pub owner: String,
}

/// A session the user has been invited to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvitedSession {
    #[serde(flatten)]
    pub summary: SessionSummary,
    pub owner: String,
}

/// Use case for creating sessions and listing them.
pub struct SessionUseCase {
    roster_loader: RosterLoader,
    sessions: Arc<dyn SessionRepository>,
    users: Arc<dyn UserRepository>,
    memberships: Arc<dyn MembershipRepository>,
    provisioning: Arc<dyn ProvisioningSink>,
    pair_locks: Arc<KeyedLocks<(String, String)>>,
    default_privacy: Privacy,
}

impl SessionUseCase {
    pub fn new(
        repositories: &Repositories,
        provisioning: Arc<dyn ProvisioningSink>,
        pair_locks: Arc<KeyedLocks<(String, String)>>,
        default_privacy: Privacy,
    ) -> Self {
        Self {
            roster_loader: RosterLoader::new(
                repositories.sessions.clone(),
                repositories.memberships.clone(),
            ),
            sessions: repositories.sessions.clone(),
            users: repositories.users.clone(),
            memberships: repositories.memberships.clone(),
            provisioning,
            pair_locks,
            default_privacy,
        }
    }

    /// Creates a session owned by `caller`.
    ///
    /// # Errors
    ///
    /// - `MissingField("sname")` if the name is absent or blank
    /// - `UnknownUser` if `caller` is not registered
    pub async fn create_session(
        &self,
        caller: &str,
        request: CreateSessionRequest,
    ) -> Result<Session> {
        let sname = request
            .sname
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ClassroomError::missing_field("sname"))?
            .to_string();

        self.users
            .find_by_username(caller)
            .await?
            .ok_or_else(|| ClassroomError::UnknownUser(caller.to_string()))?;

        let mut session = Session::new(Uuid::new_v4().to_string(), sname, caller);
        session.privacy = request.privacy.unwrap_or(self.default_privacy);
        session.description = request.description.unwrap_or_default();
        session.hidden = request.hidden.unwrap_or(false);

        self.sessions.save(&session).await?;
        {
            let _guard = self
                .pair_locks
                .lock(&(session.id.clone(), caller.to_string()))
                .await;
            self.memberships
                .insert_if_absent(Membership::new(&session.id, caller, Role::Owner))
                .await?;
        }

        tracing::info!(
            "[SessionUseCase] {} created session {} ({}, privacy={}, hidden={})",
            caller,
            session.id,
            session.sname,
            session.privacy,
            session.hidden
        );

        if let Err(e) = self.provisioning.dispatch(ProvisioningEvent::SessionCreated {
            session_id: session.id.clone(),
            owner: caller.to_string(),
        }) {
            tracing::error!(
                "[SessionUseCase] Failed to queue provisioning for session {}: {}",
                session.id,
                e
            );
        }

        Ok(session)
    }

    /// Lists every session whose hidden flag is unset, whatever its privacy.
    pub async fn list_public(&self) -> Result<Vec<SessionSummary>> {
        let sessions = self.sessions.list_all().await?;
        Ok(sessions
            .iter()
            .filter(|s| !s.hidden)
            .map(Session::summary)
            .collect())
    }

    /// Lists sessions `username` has joined, with role and owner.
    ///
    /// # Errors
    ///
    /// `OwnerNotFound` if one of the sessions has no owner.
    pub async fn list_joined(&self, username: &str) -> Result<Vec<JoinedSession>> {
        let memberships = self.memberships.list_by_user(username).await?;
        let mut joined = Vec::new();

        for membership in memberships.into_iter().filter(|m| m.role.has_joined()) {
            let Some((summary, owner)) = self.describe(&membership).await? else {
                continue;
            };
            joined.push(JoinedSession {
                summary,
                role: membership.role,
                owner,
            });
        }

        Ok(joined)
    }

    /// Lists sessions `username` has been invited to but not joined.
    ///
    /// # Errors
    ///
    /// `OwnerNotFound` if one of the sessions has no owner.
    pub async fn list_invited(&self, username: &str) -> Result<Vec<InvitedSession>> {
        let memberships = self.memberships.list_by_user(username).await?;
        let mut invited = Vec::new();

        for membership in memberships.into_iter().filter(|m| m.role == Role::Pending) {
            let Some((summary, owner)) = self.describe(&membership).await? else {
                continue;
            };
            invited.push(InvitedSession { summary, owner });
        }

        Ok(invited)
    }

    /// Summary and owner of the membership's session; `None` for a dangling
    /// membership whose session no longer exists.
    async fn describe(&self, membership: &Membership) -> Result<Option<(SessionSummary, String)>> {
        let roster = match self.roster_loader.load(&membership.session_id).await {
            Ok(roster) => roster,
            Err(ClassroomError::UnknownSession(id)) => {
                tracing::warn!(
                    "[SessionUseCase] Skipping membership {} of {}: session {} not found",
                    membership.id,
                    membership.username,
                    id
                );
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let owner = AccessPolicy::resolve_owner(&roster)?.to_string();
        Ok(Some((roster.session.summary(), owner)))
    }
}
