//! Membership repository trait.

use super::model::{Membership, Role};
use crate::error::Result;
use async_trait::async_trait;

/// Persistence contract for memberships.
///
/// Implementations must keep at most one row per `(session_id, username)`
/// pair: `insert_if_absent` and `upsert` are atomic with respect to that key.
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Finds the membership of `username` in `session_id`.
    async fn find(&self, session_id: &str, username: &str) -> Result<Option<Membership>>;

    /// Inserts `membership` unless a row already exists for its key.
    ///
    /// # Returns
    ///
    /// The stored row and `true` if it was inserted by this call, or the
    /// pre-existing row and `false`.
    async fn insert_if_absent(&self, membership: Membership) -> Result<(Membership, bool)>;

    /// Sets the role for `(session_id, username)`, inserting a row if none
    /// exists and updating the existing one in place otherwise.
    async fn upsert(&self, session_id: &str, username: &str, role: Role) -> Result<Membership>;

    /// Makes `next_owner` the OWNER of `session_id` and demotes
    /// `previous_owner` to GHOST in one atomic step, so no reader ever sees
    /// two owners or none. Returns the new owner's row.
    async fn transfer_ownership(
        &self,
        session_id: &str,
        previous_owner: &str,
        next_owner: &str,
    ) -> Result<Membership>;

    /// Lists memberships of a session ordered by membership id.
    async fn list_by_session(&self, session_id: &str) -> Result<Vec<Membership>>;

    /// Lists memberships of a user ordered by membership id.
    async fn list_by_user(&self, username: &str) -> Result<Vec<Membership>>;
}
