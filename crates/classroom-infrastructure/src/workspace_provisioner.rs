//! File system-based workspace provisioning.
//!
//! Layout below the workspace root:
//!
//! ```text
//! sessions/<session-id>/
//! ├── data/<username>/
//! │   ├── main.cpp
//! │   └── compile_commands.json
//! └── tasks/task<N>.json
//! ```

use async_trait::async_trait;
use classroom_core::error::{ClassroomError, Result};
use classroom_core::provision::{TestDefinitionWriter, WorkspaceProvisioner};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;

/// One entry of a clang compilation database.
#[derive(Debug, Serialize)]
struct CompileCommand<'a> {
    directory: String,
    command: &'a str,
    file: &'a str,
}

/// Creates session and member directories under a root directory.
pub struct FileSystemWorkspaceProvisioner {
    root_dir: PathBuf,
    compile_command: String,
}

impl FileSystemWorkspaceProvisioner {
    pub fn new(root_dir: PathBuf, compile_command: impl Into<String>) -> Self {
        Self {
            root_dir,
            compile_command: compile_command.into(),
        }
    }

    pub fn session_dir(&self, session_id: &str) -> Result<PathBuf> {
        Ok(self
            .root_dir
            .join("sessions")
            .join(path_component("session_id", session_id)?))
    }

    pub fn member_dir(&self, session_id: &str, username: &str) -> Result<PathBuf> {
        Ok(self
            .session_dir(session_id)?
            .join("data")
            .join(path_component("username", username)?))
    }

    pub fn task_file(&self, session_id: &str, task_id: u32) -> Result<PathBuf> {
        Ok(self
            .session_dir(session_id)?
            .join("tasks")
            .join(format!("task{}.json", task_id)))
    }

    async fn write_if_missing(path: &Path, contents: &[u8]) -> Result<bool> {
        if fs::try_exists(path).await? {
            return Ok(false);
        }
        fs::write(path, contents).await.map_err(|e| {
            ClassroomError::io(format!("Failed to write '{}': {}", path.display(), e))
        })?;
        Ok(true)
    }
}

/// Rejects values that would escape their parent directory.
fn path_component<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    let bad = value.is_empty()
        || value == "."
        || value == ".."
        || value.contains(['/', '\\', '\0']);
    if bad {
        return Err(ClassroomError::invalid_value(field, value));
    }
    Ok(value)
}

fn pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(buf)
}

#[async_trait]
impl WorkspaceProvisioner for FileSystemWorkspaceProvisioner {
    async fn prepare_session(&self, session_id: &str) -> Result<()> {
        let data_dir = self.session_dir(session_id)?.join("data");
        fs::create_dir_all(&data_dir).await.map_err(|e| {
            ClassroomError::io(format!(
                "Failed to create session directory '{}': {}",
                data_dir.display(),
                e
            ))
        })?;
        Ok(())
    }

    async fn provision(&self, session_id: &str, username: &str) -> Result<()> {
        let member_dir = self.member_dir(session_id, username)?;
        fs::create_dir_all(&member_dir).await.map_err(|e| {
            ClassroomError::io(format!(
                "Failed to create workspace '{}': {}",
                member_dir.display(),
                e
            ))
        })?;

        let created_source = Self::write_if_missing(&member_dir.join("main.cpp"), b"").await?;

        let database = [CompileCommand {
            directory: member_dir.to_string_lossy().into_owned(),
            command: &self.compile_command,
            file: "main.cpp",
        }];
        let created_database = Self::write_if_missing(
            &member_dir.join("compile_commands.json"),
            &pretty_json(&database)?,
        )
        .await?;

        if created_source || created_database {
            tracing::info!(
                "[FileSystemWorkspaceProvisioner] Provisioned workspace for {} in session {}",
                username,
                session_id
            );
        }
        Ok(())
    }
}

#[async_trait]
impl TestDefinitionWriter for FileSystemWorkspaceProvisioner {
    async fn write_cases(&self, session_id: &str, task_id: u32, cases: &[Value]) -> Result<()> {
        let path = self.task_file(session_id, task_id)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let body = pretty_json(&serde_json::json!({ "cases": cases }))?;
        fs::write(&path, body).await.map_err(|e| {
            ClassroomError::io(format!("Failed to write '{}': {}", path.display(), e))
        })?;

        tracing::debug!(
            "[FileSystemWorkspaceProvisioner] Wrote {} cases to {}",
            cases.len(),
            path.display()
        );
        Ok(())
    }
}
