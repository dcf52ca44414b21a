use crate::error::{ClassroomError, ForbiddenReason, Result};
use crate::membership::Role;
use crate::session::{Privacy, SessionRoster};

/// Tracing target for refused operations.
pub const AUDIT_TARGET: &str = "classroom::audit";
/// Tracing target for membership data that violates the one-owner invariant.
pub const INTEGRITY_TARGET: &str = "classroom::integrity";

/// Side-effect-free authorization rules over a [`SessionRoster`].
pub struct AccessPolicy;

impl AccessPolicy {
    /// True iff `username` holds an OWNER membership on the session.
    pub fn is_owner(roster: &SessionRoster, username: &str) -> bool {
        roster
            .memberships
            .iter()
            .any(|m| m.role == Role::Owner && m.username == username)
    }

    pub fn can_invite(roster: &SessionRoster, caller: &str) -> bool {
        Self::is_owner(roster, caller)
    }

    /// True iff `caller` is the owner returned by [`Self::resolve_owner`].
    ///
    /// Agrees with [`Self::is_owner`] whenever the session has exactly one
    /// OWNER membership.
    pub fn can_set_permission(roster: &SessionRoster, caller: &str) -> bool {
        Self::resolve_owner(roster).is_ok_and(|owner| owner == caller)
    }

    pub fn can_create_task(roster: &SessionRoster, caller: &str) -> bool {
        Self::is_owner(roster, caller)
    }

    /// Returns the username of the session owner.
    ///
    /// The owner recorded on the session wins when it is backed by an OWNER
    /// membership. Otherwise the OWNER membership with the lowest id is
    /// chosen. Several OWNER rows are logged, never fatal.
    ///
    /// # Errors
    ///
    /// `OwnerNotFound` when no membership carries the OWNER role.
    pub fn resolve_owner(roster: &SessionRoster) -> Result<&str> {
        let owners = roster.owners();
        let session_id = roster.session_id();

        if owners.len() > 1 {
            tracing::warn!(
                target: INTEGRITY_TARGET,
                session_id,
                owners = owners.len(),
                "session has more than one OWNER membership"
            );
        }

        let recorded = roster.session.owner.as_str();
        if let Some(m) = owners.iter().find(|m| m.username == recorded) {
            return Ok(m.username.as_str());
        }

        match owners.first() {
            Some(first) => {
                tracing::warn!(
                    target: INTEGRITY_TARGET,
                    session_id,
                    recorded_owner = recorded,
                    resolved_owner = first.username.as_str(),
                    "recorded owner holds no OWNER membership, using lowest membership id"
                );
                Ok(first.username.as_str())
            }
            None => {
                tracing::error!(
                    target: INTEGRITY_TARGET,
                    session_id,
                    "session has no OWNER membership"
                );
                Err(ClassroomError::OwnerNotFound(session_id.to_string()))
            }
        }
    }

    /// Role a caller ends up with after joining a session.
    ///
    /// | privacy          | no membership        | PENDING | other   |
    /// |------------------|----------------------|---------|---------|
    /// | public / hidden  | GHOST                | PENDING | unchanged |
    /// | private          | `Forbidden(NotInvited)` | GHOST | unchanged |
    pub fn default_role_on_join(privacy: Privacy, existing: Option<Role>) -> Result<Role> {
        match (privacy.requires_invitation(), existing) {
            (false, None) => Ok(Role::Ghost),
            (true, None) => Err(ClassroomError::forbidden(ForbiddenReason::NotInvited)),
            (true, Some(Role::Pending)) => Ok(Role::Ghost),
            (_, Some(role)) => Ok(role),
        }
    }
}
