//! A session together with its memberships.

use super::model::Session;
use crate::membership::{Membership, Role};

/// A session loaded with every membership row that references it.
///
/// Access decisions are made over this aggregate so that a single load
/// answers every "who holds which role" question for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRoster {
    pub session: Session,
    pub memberships: Vec<Membership>,
}

impl SessionRoster {
    pub fn new(session: Session, memberships: Vec<Membership>) -> Self {
        Self {
            session,
            memberships,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session.id
    }

    /// Returns the membership of `username`, if any.
    ///
    /// When the store holds more than one row for the user, the one with the
    /// lowest membership id wins.
    pub fn membership_of(&self, username: &str) -> Option<&Membership> {
        self.memberships
            .iter()
            .filter(|m| m.username == username)
            .min_by_key(|m| m.id)
    }

    /// Returns OWNER memberships ordered by membership id.
    pub fn owners(&self) -> Vec<&Membership> {
        let mut owners: Vec<&Membership> = self
            .memberships
            .iter()
            .filter(|m| m.role == Role::Owner)
            .collect();
        owners.sort_by_key(|m| m.id);
        owners
    }
}
