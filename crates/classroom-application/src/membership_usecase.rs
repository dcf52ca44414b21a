//! Membership lifecycle: invite, join and permission changes.
//!
//! Per `(session, user)` pair the states are ABSENT, PENDING, GHOST and
//! OWNER. Every read-decide-write step runs under the pair's lock and
//! writes through `insert_if_absent`/`upsert`, so a pair never ends up with
//! two rows.

use crate::session::{KeyedLocks, RosterLoader};
use crate::Repositories;
use classroom_core::access::{AUDIT_TARGET, AccessPolicy};
use classroom_core::error::{ClassroomError, ForbiddenReason, Result};
use classroom_core::membership::{Membership, MembershipRepository, Role};
use classroom_core::provision::{ProvisioningEvent, ProvisioningSink};
use classroom_core::session::SessionRepository;
use classroom_core::user::UserRepository;
use std::sync::Arc;

type PairKey = (String, String);

fn pair(session_id: &str, username: &str) -> PairKey {
    (session_id.to_string(), username.to_string())
}

pub struct MembershipUseCase {
    roster_loader: RosterLoader,
    sessions: Arc<dyn SessionRepository>,
    users: Arc<dyn UserRepository>,
    memberships: Arc<dyn MembershipRepository>,
    provisioning: Arc<dyn ProvisioningSink>,
    /// Serializes transitions of one (session, user) pair
    pair_locks: Arc<KeyedLocks<PairKey>>,
    /// Serializes owner-gated writes of one session
    session_locks: Arc<KeyedLocks<String>>,
}

impl MembershipUseCase {
    /// `pair_locks` must be shared with every other writer of memberships
    /// (session creation), and `session_locks` with every owner-gated use
    /// case (task creation), so they exclude each other. A session lock is
    /// always taken before a pair lock.
    pub fn new(
        repositories: &Repositories,
        provisioning: Arc<dyn ProvisioningSink>,
        pair_locks: Arc<KeyedLocks<PairKey>>,
        session_locks: Arc<KeyedLocks<String>>,
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
            session_locks,
        }
    }

    /// Invites `invitee` to a session as PENDING.
    ///
    /// An invitee who already holds any membership keeps it unchanged.
    ///
    /// # Errors
    ///
    /// - `UnknownUser` / `UnknownSession` if either entity is missing
    /// - `Forbidden(NotOwner)` if `inviter` does not own the session
    pub async fn invite(
        &self,
        session_id: &str,
        inviter: &str,
        invitee: &str,
    ) -> Result<Membership> {
        tracing::debug!(
            "[MembershipUseCase] invite() session={} inviter={} invitee={}",
            session_id,
            inviter,
            invitee
        );

        self.require_user(invitee).await?;

        // Ownership cannot change between the check and the insert.
        let _session = self.session_locks.lock(&session_id.to_string()).await;
        let roster = self.roster_loader.load(session_id).await?;

        if !AccessPolicy::can_invite(&roster, inviter) {
            tracing::warn!(
                target: AUDIT_TARGET,
                session_id,
                caller = inviter,
                action = "invite",
                "refused: caller is not the session owner"
            );
            return Err(ClassroomError::forbidden(ForbiddenReason::NotOwner));
        }

        let _guard = self.pair_locks.lock(&pair(session_id, invitee)).await;
        let (membership, inserted) = self
            .memberships
            .insert_if_absent(Membership::new(session_id, invitee, Role::Pending))
            .await?;

        if inserted {
            tracing::info!(
                "[MembershipUseCase] {} invited {} to session {}",
                inviter,
                invitee,
                session_id
            );
        } else {
            tracing::debug!(
                "[MembershipUseCase] {} already holds {} in session {}, invite is a no-op",
                invitee,
                membership.role,
                session_id
            );
        }

        Ok(membership)
    }

    /// Joins `caller` to a session.
    ///
    /// Open sessions admit anyone as GHOST; private sessions only admit
    /// existing members and promote a PENDING invitee to GHOST. Repeated
    /// joins leave the membership unchanged. Every successful join queues a
    /// workspace provisioning event.
    ///
    /// # Errors
    ///
    /// - `UnknownSession` if the session is missing
    /// - `Forbidden(NotInvited)` for a private session without membership
    pub async fn join(&self, session_id: &str, caller: &str) -> Result<Membership> {
        tracing::debug!(
            "[MembershipUseCase] join() session={} caller={}",
            session_id,
            caller
        );

        let roster = self.roster_loader.load(session_id).await?;
        let privacy = roster.session.privacy;

        let membership = {
            let _guard = self.pair_locks.lock(&pair(session_id, caller)).await;
            let existing = self.memberships.find(session_id, caller).await?;

            let role = match AccessPolicy::default_role_on_join(
                privacy,
                existing.as_ref().map(|m| m.role),
            ) {
                Ok(role) => role,
                Err(e) => {
                    tracing::warn!(
                        target: AUDIT_TARGET,
                        session_id,
                        caller,
                        action = "join",
                        "refused: {}",
                        e
                    );
                    return Err(e);
                }
            };

            match existing {
                None => {
                    let (membership, _) = self
                        .memberships
                        .insert_if_absent(Membership::new(session_id, caller, role))
                        .await?;
                    tracing::info!(
                        "[MembershipUseCase] {} joined session {} as {}",
                        caller,
                        session_id,
                        membership.role
                    );
                    membership
                }
                Some(current) if current.role != role => {
                    let membership = self.memberships.upsert(session_id, caller, role).await?;
                    tracing::info!(
                        "[MembershipUseCase] {} accepted invitation to session {}: {} -> {}",
                        caller,
                        session_id,
                        current.role,
                        membership.role
                    );
                    membership
                }
                Some(current) => current,
            }
        };

        self.queue(ProvisioningEvent::MemberJoined {
            session_id: session_id.to_string(),
            username: caller.to_string(),
        });

        Ok(membership)
    }

    /// Assigns `role` to `target` in a session.
    ///
    /// Updates the existing membership in place or creates one. Giving OWNER
    /// to another user transfers ownership: the previous owner becomes GHOST.
    ///
    /// # Errors
    ///
    /// - `UnknownSession` / `UnknownUser` if either entity is missing
    /// - `MissingField("role")` / `InvalidValue` for absent or unknown roles
    /// - `OwnerNotFound` if the session has no owner
    /// - `Forbidden(NotOwner)` if `caller` is not the session owner
    /// - `InvalidValue` when demoting the owner without a transfer
    pub async fn set_permission(
        &self,
        session_id: &str,
        caller: &str,
        target: &str,
        role: Option<&str>,
    ) -> Result<Membership> {
        tracing::debug!(
            "[MembershipUseCase] set_permission() session={} caller={} target={} role={:?}",
            session_id,
            caller,
            target,
            role
        );

        // Validate inputs before taking any lock.
        self.roster_loader.load(session_id).await?;
        self.require_user(target).await?;
        let role = Role::parse_assigned(role)?;

        let _session = self.session_locks.lock(&session_id.to_string()).await;
        let roster = self.roster_loader.load(session_id).await?;
        let owner = AccessPolicy::resolve_owner(&roster)?.to_string();

        if !AccessPolicy::can_set_permission(&roster, caller) {
            tracing::warn!(
                target: AUDIT_TARGET,
                session_id,
                caller,
                action = "set_permission",
                "refused: caller is not the session owner"
            );
            return Err(ClassroomError::forbidden(ForbiddenReason::NotOwner));
        }

        if target == owner {
            if role != Role::Owner {
                return Err(ClassroomError::invalid_value(
                    "role",
                    format!("{} (transfer ownership before demoting the owner)", role),
                ));
            }
            let _guard = self.pair_locks.lock(&pair(session_id, target)).await;
            return self.memberships.upsert(session_id, target, role).await;
        }

        if role == Role::Owner {
            let _guards = self
                .pair_locks
                .lock_many(&[pair(session_id, target), pair(session_id, &owner)])
                .await;

            let membership = self
                .memberships
                .transfer_ownership(session_id, &owner, target)
                .await?;

            let mut session = roster.session.clone();
            session.owner = target.to_string();
            self.sessions.save(&session).await?;

            tracing::info!(
                "[MembershipUseCase] ownership of session {} transferred from {} to {}",
                session_id,
                owner,
                target
            );
            return Ok(membership);
        }

        let _guard = self.pair_locks.lock(&pair(session_id, target)).await;
        let membership = self.memberships.upsert(session_id, target, role).await?;
        tracing::info!(
            "[MembershipUseCase] {} set role of {} in session {} to {}",
            caller,
            target,
            session_id,
            membership.role
        );
        Ok(membership)
    }

    async fn require_user(&self, username: &str) -> Result<()> {
        self.users
            .find_by_username(username)
            .await?
            .map(|_| ())
            .ok_or_else(|| ClassroomError::UnknownUser(username.to_string()))
    }

    /// Hands an event to the provisioning queue. A full or closed queue does
    /// not undo the committed transition.
    fn queue(&self, event: ProvisioningEvent) {
        if let Err(e) = self.provisioning.dispatch(event.clone()) {
            tracing::error!(
                "[MembershipUseCase] Failed to queue provisioning for {} in session {}: {}",
                event.username(),
                event.session_id(),
                e
            );
        }
    }
}
