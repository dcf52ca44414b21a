//! Session repository trait.

use super::model::Session;
use crate::error::Result;
use async_trait::async_trait;

/// An abstract repository for managing session persistence.
///
/// Decouples the use cases from the storage mechanism (in-memory maps,
/// snapshot files, a database).
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Finds a session by its ID.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Session))`: Session found
    /// - `Ok(None)`: Session not found
    /// - `Err(_)`: Error occurred during retrieval
    async fn find_by_id(&self, session_id: &str) -> Result<Option<Session>>;

    /// Saves a session, replacing any stored version with the same ID.
    async fn save(&self, session: &Session) -> Result<()>;

    /// Lists all stored sessions ordered by creation time.
    async fn list_all(&self) -> Result<Vec<Session>>;
}
