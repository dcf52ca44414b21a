//! Entity store persisted as a JSON snapshot file.
//!
//! The snapshot is loaded into an [`InMemoryEntityStore`] on open and
//! written back with [`JsonSnapshotStore::persist`]. The file lock is held
//! from open until drop, so two processes never interleave their
//! load/persist cycles.

use crate::memory_store::{EntitySnapshot, InMemoryEntityStore};
use crate::storage::atomic_file::{AtomicFile, FileFormat, FileLock};
use classroom_core::error::{ClassroomError, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct JsonSnapshotStore {
    file: AtomicFile<EntitySnapshot>,
    store: Arc<InMemoryEntityStore>,
    _lock: FileLock,
}

impl JsonSnapshotStore {
    /// Opens the snapshot at `path`, starting empty if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock cannot be taken, and
    /// [`ClassroomError::DataAccess`] if the snapshot cannot be read.
    pub fn open(path: &Path) -> Result<Self> {
        let lock = FileLock::acquire(path)?;
        let file: AtomicFile<EntitySnapshot> =
            AtomicFile::with_format(path.to_path_buf(), FileFormat::Json);
        let snapshot = file
            .load()
            .map_err(|e| ClassroomError::data_access(e.to_string()))?
            .unwrap_or_default();

        tracing::debug!(
            "[JsonSnapshotStore] Opened {} ({} sessions, {} memberships)",
            path.display(),
            snapshot.sessions.len(),
            snapshot.memberships.len()
        );

        Ok(Self {
            file,
            store: Arc::new(InMemoryEntityStore::from_snapshot(snapshot)),
            _lock: lock,
        })
    }

    /// The live store backing this snapshot.
    pub fn store(&self) -> Arc<InMemoryEntityStore> {
        self.store.clone()
    }

    pub fn path(&self) -> PathBuf {
        self.file.path().to_path_buf()
    }

    /// Writes the current state back to disk.
    ///
    /// # Errors
    ///
    /// Returns [`ClassroomError::DataAccess`] if the snapshot cannot be written.
    pub async fn persist(&self) -> Result<()> {
        let snapshot = self.store.snapshot().await;
        self.file.save(&snapshot).map_err(|e| {
            tracing::error!("[JsonSnapshotStore] Failed to persist: {}", e);
            ClassroomError::data_access(e.to_string())
        })?;
        tracing::debug!("[JsonSnapshotStore] Persisted {}", self.file.path().display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classroom_core::membership::{MembershipRepository, Role};
    use classroom_core::session::{Session, SessionRepository};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_state_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state.json");

        {
            let snapshot_store = JsonSnapshotStore::open(&path).unwrap();
            let store = snapshot_store.store();
            SessionRepository::save(&*store, &Session::new("s1", "Graphs", "alice"))
                .await
                .unwrap();
            store.upsert("s1", "alice", Role::Owner).await.unwrap();
            snapshot_store.persist().await.unwrap();
        }

        let reopened = JsonSnapshotStore::open(&path).unwrap();
        let store = reopened.store();
        let session = store.find_by_id("s1").await.unwrap().unwrap();
        assert_eq!(session.sname, "Graphs");
        let owner = MembershipRepository::find(&*store, "s1", "alice")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(owner.role, Role::Owner);
    }

    #[tokio::test]
    async fn test_open_missing_file_starts_empty() {
        let temp_dir = TempDir::new().unwrap();
        let snapshot_store = JsonSnapshotStore::open(&temp_dir.path().join("none.json")).unwrap();
        assert!(snapshot_store.store().list_all().await.unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_snapshot_is_a_data_access_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state.json");
        std::fs::write(&path, "{ \"sessions\": [").unwrap();

        let err = JsonSnapshotStore::open(&path).err().unwrap();
        assert!(matches!(err, ClassroomError::DataAccess(_)));
        assert!(err.to_string().contains("state.json"));
    }

    #[tokio::test]
    async fn test_persist_failure_is_a_data_access_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state.json");
        let snapshot_store = JsonSnapshotStore::open(&path).unwrap();

        // A directory in place of the snapshot makes the final rename fail.
        std::fs::create_dir(&path).unwrap();

        let err = snapshot_store.persist().await.unwrap_err();
        assert!(matches!(err, ClassroomError::DataAccess(_)));
    }
}
