//! Infrastructure for Classroom: entity storage, configuration and the
//! file system / real-time collaborators.

pub mod config_service;
pub mod memory_store;
pub mod namespace_registry;
pub mod paths;
pub mod snapshot_store;
pub mod storage;
pub mod workspace_provisioner;

pub use crate::config_service::ConfigService;
pub use crate::memory_store::{EntitySnapshot, InMemoryEntityStore};
pub use crate::namespace_registry::InMemoryNamespaceRegistry;
pub use crate::paths::ClassroomPaths;
pub use crate::snapshot_store::JsonSnapshotStore;
pub use crate::workspace_provisioner::FileSystemWorkspaceProvisioner;
