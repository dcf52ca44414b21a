//! Unified path management for classroom files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/classroom/         # Config directory
//! └── config.toml              # Application configuration
//!
//! ~/.local/share/classroom/    # Data directory
//! ├── state.json               # Entity snapshot
//! └── sessions/                # Per-session workspaces
//!     └── <session-id>/
//!         ├── data/<username>/ # main.cpp, compile_commands.json
//!         └── tasks/           # task<N>.json test definitions
//! ```

use std::path::{Path, PathBuf};

const APP_DIR: &str = "classroom";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for classroom_core::ClassroomError {
    fn from(e: PathError) -> Self {
        classroom_core::ClassroomError::config(e.to_string())
    }
}

/// Resolves classroom locations, optionally below a fixed base directory.
///
/// With a base directory (tests, portable installs) config and data both
/// live under it; otherwise the platform directories from `dirs` are used.
#[derive(Debug, Clone, Default)]
pub struct ClassroomPaths {
    base_dir: Option<PathBuf>,
}

impl ClassroomPaths {
    pub fn new(base_dir: Option<&Path>) -> Self {
        Self {
            base_dir: base_dir.map(Path::to_path_buf),
        }
    }

    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base_dir {
            Some(base) => Ok(base.clone()),
            None => dirs::config_dir()
                .map(|d| d.join(APP_DIR))
                .ok_or(PathError::HomeDirNotFound),
        }
    }

    pub fn data_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base_dir {
            Some(base) => Ok(base.clone()),
            None => dirs::data_dir()
                .map(|d| d.join(APP_DIR))
                .ok_or(PathError::HomeDirNotFound),
        }
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    pub fn state_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.data_dir()?.join("state.json"))
    }

    /// Root under which `sessions/<id>/...` is created.
    pub fn workspace_root(&self) -> Result<PathBuf, PathError> {
        self.data_dir()
    }
}
