//! Loading of `config.toml`.

use crate::paths::ClassroomPaths;
use crate::storage::AtomicFile;
use crate::storage::atomic_file::FileLock;
use classroom_core::config::ClassroomConfig;
use classroom_core::error::Result;
use std::path::{Path, PathBuf};

/// Reads and writes the application configuration file.
pub struct ConfigService {
    file: AtomicFile<ClassroomConfig>,
    paths: ClassroomPaths,
}

impl ConfigService {
    /// Uses `path` when given, otherwise the default config file location.
    pub fn new(path: Option<&Path>, paths: ClassroomPaths) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => paths.config_file()?,
        };
        Ok(Self {
            file: AtomicFile::new(path),
            paths,
        })
    }

    /// Loads the configuration, falling back to defaults when the file is
    /// missing or empty. Unset locations are filled from [`ClassroomPaths`].
    pub fn load(&self) -> Result<ClassroomConfig> {
        let mut config = match self.file.load()? {
            Some(config) => config,
            None => {
                tracing::debug!(
                    "[ConfigService] No config at {}, using defaults",
                    self.file.path().display()
                );
                ClassroomConfig::default()
            }
        };

        if config.workspace_root.is_none() {
            config.workspace_root = Some(self.paths.workspace_root()?);
        }
        if config.state_file.is_none() {
            config.state_file = Some(self.paths.state_file()?);
        }

        Ok(config)
    }

    /// Writes `config` while holding the file lock.
    pub fn save(&self, config: &ClassroomConfig) -> Result<()> {
        let _lock = FileLock::acquire(self.file.path())?;
        self.file.save(config)?;
        Ok(())
    }

    pub fn path(&self) -> PathBuf {
        self.file.path().to_path_buf()
    }
}
