//! Task domain model.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A graded exercise belonging to one session.
///
/// Test cases are not part of the entity; they are written out by a
/// `TestDefinitionWriter` keyed by `(session_id, id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub session_id: String,
    /// Sequence id, unique within the session and starting at 1
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Ordered hints revealed to members
    #[serde(default)]
    pub hints: Vec<String>,
    pub created_at: String,
}

/// A task creation request as received from the transport layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskSpec {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub hints: Option<Vec<String>>,
    /// Literal test-case payload; must be present and non-empty
    #[serde(default)]
    pub cases: Option<Vec<Value>>,
}

impl TaskSpec {
    /// Builds the task entity for the allocated sequence id.
    pub fn into_task(self, session_id: impl Into<String>, id: u32) -> Task {
        Task {
            session_id: session_id.into(),
            id,
            name: self.name.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            hints: self.hints.unwrap_or_default(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
