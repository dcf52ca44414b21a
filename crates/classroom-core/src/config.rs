//! Application configuration model.

use crate::session::Privacy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default compile command written into each member's `compile_commands.json`.
pub const DEFAULT_COMPILE_COMMAND: &str =
    "clang++ --target=x86_64-w64-mingw32 -o main.exe main.cpp";

/// Root configuration, usually loaded from `config.toml`.
///
/// Every field has a default so that a missing or partial file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassroomConfig {
    /// Directory holding `sessions/<id>/...`; platform default when unset
    pub workspace_root: Option<PathBuf>,
    /// JSON entity snapshot; platform default when unset
    pub state_file: Option<PathBuf>,
    /// Privacy applied when a session is created without one
    pub default_privacy: Privacy,
    pub compile_command: String,
    /// Fallback filter when `RUST_LOG` is not set
    pub log_level: String,
}

impl Default for ClassroomConfig {
    fn default() -> Self {
        Self {
            workspace_root: None,
            state_file: None,
            default_privacy: Privacy::Public,
            compile_command: DEFAULT_COMPILE_COMMAND.to_string(),
            log_level: "info".to_string(),
        }
    }
}
