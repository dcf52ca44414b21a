use serde::{Deserialize, Serialize};

/// A registered user, identified by username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub created_at: String,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
