//! Membership domain model.

use crate::error::{ClassroomError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumString};

/// The role a user holds within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Role {
    /// Full control: invite, set permissions, create tasks.
    Owner,
    /// Invited but not yet joined.
    Pending,
    /// Joined member without elevated privilege.
    Ghost,
}

impl Role {
    /// Parses a role supplied by a permission-setting request.
    ///
    /// Blank or absent input is a missing field; anything outside the
    /// known roles is rejected instead of being persisted verbatim.
    pub fn parse_assigned(raw: Option<&str>) -> Result<Role> {
        let raw = raw
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ClassroomError::missing_field("role"))?;
        Role::from_str(raw).map_err(|_| ClassroomError::invalid_value("role", raw))
    }

    /// Returns true for roles that count as having joined the session.
    pub fn has_joined(&self) -> bool {
        !matches!(self, Role::Pending)
    }
}

/// Relationship record binding one user to one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    /// Store-assigned, monotonically increasing identifier
    pub id: u64,
    pub session_id: String,
    pub username: String,
    pub role: Role,
    /// Timestamp of the last role change (RFC 3339)
    pub updated_at: String,
}

impl Membership {
    /// Creates an unsaved membership; the store assigns `id` on insert.
    pub fn new(session_id: impl Into<String>, username: impl Into<String>, role: Role) -> Self {
        Self {
            id: 0,
            session_id: session_id.into(),
            username: username.into(),
            role,
            updated_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assigned_accepts_known_roles() {
        assert_eq!(Role::parse_assigned(Some("OWNER")).unwrap(), Role::Owner);
        assert_eq!(Role::parse_assigned(Some("ghost")).unwrap(), Role::Ghost);
        assert_eq!(Role::parse_assigned(Some(" Pending ")).unwrap(), Role::Pending);
    }

    #[test]
    fn test_parse_assigned_rejects_missing_and_unknown() {
        let err = Role::parse_assigned(None).unwrap_err();
        assert!(matches!(err, ClassroomError::MissingField(ref f) if f == "role"));

        let err = Role::parse_assigned(Some("   ")).unwrap_err();
        assert!(matches!(err, ClassroomError::MissingField(_)));

        let err = Role::parse_assigned(Some("ADMIN")).unwrap_err();
        assert!(matches!(err, ClassroomError::InvalidValue { ref value, .. } if value == "ADMIN"));
    }

    #[test]
    fn test_role_wire_format() {
        assert_eq!(serde_json::to_string(&Role::Ghost).unwrap(), "\"GHOST\"");
        assert_eq!(Role::Pending.to_string(), "PENDING");
        assert!(!Role::Pending.has_joined());
        assert!(Role::Owner.has_joined());
    }
}
