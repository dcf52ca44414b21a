use super::model::User;
use crate::error::Result;
use async_trait::async_trait;

/// Lookup and registration of users.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds a user by username.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(User))`: User found
    /// - `Ok(None)`: No such user
    /// - `Err(_)`: Error occurred during retrieval
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Saves a user, replacing any stored user with the same username.
    async fn save(&self, user: &User) -> Result<()>;
}
