use anyhow::{Context, Result};
use classroom_application::{ClassroomServices, Repositories};
use classroom_core::config::ClassroomConfig;
use classroom_core::user::UserRepository;
use classroom_execution::ProvisioningDispatcher;
use classroom_infrastructure::{
    ClassroomPaths, ConfigService, FileSystemWorkspaceProvisioner, InMemoryNamespaceRegistry,
    JsonSnapshotStore,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Locations given on the command line.
#[derive(Debug, Default)]
pub struct Overrides {
    pub config: Option<PathBuf>,
    pub state: Option<PathBuf>,
    pub workspace_root: Option<PathBuf>,
}

/// Loads `config.toml` and applies the command-line overrides.
pub fn load_config(overrides: &Overrides) -> Result<ClassroomConfig> {
    let service = ConfigService::new(overrides.config.as_deref(), ClassroomPaths::new(None))
        .context("Failed to resolve config location")?;
    let mut config = service
        .load()
        .with_context(|| format!("Failed to load {}", service.path().display()))?;

    if let Some(state) = &overrides.state {
        config.state_file = Some(state.clone());
    }
    if let Some(root) = &overrides.workspace_root {
        config.workspace_root = Some(root.clone());
    }
    Ok(config)
}

/// The running application: persisted store, services and the
/// provisioning worker.
pub struct App {
    pub services: ClassroomServices,
    pub users: Arc<dyn UserRepository>,
    snapshot: JsonSnapshotStore,
    dispatcher: Arc<ProvisioningDispatcher>,
}

impl App {
    /// Opens the state file and starts the provisioning dispatcher.
    ///
    /// Must be called inside a tokio runtime.
    pub fn bootstrap(config: &ClassroomConfig) -> Result<Self> {
        let state_file = config
            .state_file
            .as_deref()
            .context("state_file is not configured")?;
        let workspace_root = config
            .workspace_root
            .clone()
            .context("workspace_root is not configured")?;

        let snapshot = JsonSnapshotStore::open(state_file)
            .with_context(|| format!("Failed to open state file {}", state_file.display()))?;
        let repositories = Repositories::from_store(snapshot.store());
        let users = repositories.users.clone();

        let provisioner = Arc::new(FileSystemWorkspaceProvisioner::new(
            workspace_root,
            config.compile_command.clone(),
        ));
        let namespaces = Arc::new(InMemoryNamespaceRegistry::new());
        let dispatcher = Arc::new(ProvisioningDispatcher::spawn(
            provisioner.clone(),
            namespaces,
        ));

        let services = ClassroomServices::new(
            repositories,
            dispatcher.clone(),
            provisioner,
            config.default_privacy,
        );

        tracing::debug!(
            "[App] Bootstrapped with state {}",
            snapshot.path().display()
        );

        Ok(Self {
            services,
            users,
            snapshot,
            dispatcher,
        })
    }

    /// Drains pending provisioning jobs and writes the state file.
    pub async fn finish(&self) -> Result<()> {
        let stats = self.dispatcher.shutdown().await;
        if stats.failed > 0 {
            tracing::warn!(
                "[App] {} of {} provisioning jobs failed",
                stats.failed,
                stats.applied + stats.failed
            );
        }

        self.snapshot
            .persist()
            .await
            .with_context(|| format!("Failed to write {}", self.snapshot.path().display()))
    }
}
