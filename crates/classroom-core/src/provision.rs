//! Side-effecting collaborators triggered after membership transitions.
//!
//! Decisions in the use cases never wait on these: a committed transition
//! emits a [`ProvisioningEvent`] through a [`ProvisioningSink`], and a worker
//! applies it using the provisioner and namespace traits below. Every
//! implementation must be idempotent because a user may re-join at any time.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Post-commit work produced by session creation and joins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProvisioningEvent {
    /// A session was created; its data directory, the owner's workspace and
    /// the real-time namespace must exist.
    SessionCreated { session_id: String, owner: String },
    /// A user joined (or re-joined) a session.
    MemberJoined { session_id: String, username: String },
}

impl ProvisioningEvent {
    pub fn session_id(&self) -> &str {
        match self {
            Self::SessionCreated { session_id, .. } | Self::MemberJoined { session_id, .. } => {
                session_id
            }
        }
    }

    /// The user whose workspace must be provisioned.
    pub fn username(&self) -> &str {
        match self {
            Self::SessionCreated { owner, .. } => owner,
            Self::MemberJoined { username, .. } => username,
        }
    }
}

/// Non-blocking hand-off of post-commit work.
pub trait ProvisioningSink: Send + Sync {
    /// Queues `event`. Must not block on I/O.
    fn dispatch(&self, event: ProvisioningEvent) -> Result<()>;
}

/// Creates per-user workspace files for a session.
#[async_trait]
pub trait WorkspaceProvisioner: Send + Sync {
    /// Ensures the session-wide data directory exists.
    async fn prepare_session(&self, session_id: &str) -> Result<()>;

    /// Ensures `username` has a workspace in `session_id`. Existing files
    /// are left untouched.
    async fn provision(&self, session_id: &str, username: &str) -> Result<()>;
}

/// Registers real-time channels for sessions.
#[async_trait]
pub trait NamespaceNotifier: Send + Sync {
    /// Ensures the namespace `/<session_id>` exists.
    async fn ensure_namespace(&self, session_id: &str) -> Result<()>;
}

/// Persists the literal test-case payload of a task.
#[async_trait]
pub trait TestDefinitionWriter: Send + Sync {
    async fn write_cases(&self, session_id: &str, task_id: u32, cases: &[Value]) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_accessors() {
        let created = ProvisioningEvent::SessionCreated {
            session_id: "s1".into(),
            owner: "alice".into(),
        };
        assert_eq!(created.session_id(), "s1");
        assert_eq!(created.username(), "alice");

        let joined = ProvisioningEvent::MemberJoined {
            session_id: "s2".into(),
            username: "bob".into(),
        };
        assert_eq!(joined.session_id(), "s2");
        assert_eq!(joined.username(), "bob");
    }

    #[test]
    fn test_event_wire_format() {
        let joined = ProvisioningEvent::MemberJoined {
            session_id: "s2".into(),
            username: "bob".into(),
        };
        let json = serde_json::to_value(&joined).unwrap();
        assert_eq!(json["type"], "member_joined");
        assert_eq!(json["username"], "bob");
    }
}
