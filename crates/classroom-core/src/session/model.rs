//! Session domain model.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Session-wide policy governing who may join without an invitation.
///
/// `Public` and `Hidden` share join rules; they only differ in how clients
/// present them. Listing visibility is controlled by [`Session::hidden`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Privacy {
    /// Anyone may join.
    #[default]
    Public,
    /// Anyone may join.
    Hidden,
    /// Only invited users may join.
    Private,
}

impl Privacy {
    /// Returns true if joining requires an existing membership.
    pub fn requires_invitation(&self) -> bool {
        matches!(self, Privacy::Private)
    }
}

/// A shared coding/teaching session.
///
/// Memberships and tasks are stored separately and referenced by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Server-assigned identifier (UUID format)
    pub id: String,
    /// Human-readable session name
    pub sname: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Join policy
    #[serde(default)]
    pub privacy: Privacy,
    /// Excluded from the public listing when set
    #[serde(default)]
    pub hidden: bool,
    /// Username holding the OWNER membership
    pub owner: String,
    /// Timestamp when the session was created (RFC 3339)
    pub created_at: String,
}

impl Session {
    /// Creates a session owned by `owner` with a freshly generated timestamp.
    pub fn new(
        id: impl Into<String>,
        sname: impl Into<String>,
        owner: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            sname: sname.into(),
            description: String::new(),
            privacy: Privacy::default(),
            hidden: false,
            owner: owner.into(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id.clone(),
            sname: self.sname.clone(),
            description: self.description.clone(),
        }
    }
}

/// Publicly listable projection of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: String,
    pub sname: String,
    pub description: String,
}
