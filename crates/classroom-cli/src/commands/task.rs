use super::utils::{print_json, require_caller};
use crate::app::App;
use anyhow::{Context, Result};
use classroom_core::task::TaskSpec;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Command-line inputs of `task create`.
pub struct TaskInput {
    pub cases_file: PathBuf,
    pub name: Option<String>,
    pub description: Option<String>,
    pub hints: Vec<String>,
}

pub async fn create(
    app: &App,
    caller: Option<&str>,
    session_id: &str,
    input: TaskInput,
) -> Result<()> {
    let caller = require_caller(caller)?;
    let spec = TaskSpec {
        name: input.name,
        description: input.description,
        hints: (!input.hints.is_empty()).then_some(input.hints),
        cases: Some(read_cases(&input.cases_file)?),
    };
    let task = app.services.tasks.create_task(session_id, caller, spec).await?;
    print_json(&task)
}

/// Reads test cases from either a JSON array or a `{"cases": [...]}` object.
fn read_cases(path: &Path) -> Result<Vec<Value>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in {}", path.display()))?;

    match value {
        Value::Array(cases) => Ok(cases),
        Value::Object(mut object) => match object.remove("cases") {
            Some(Value::Array(cases)) => Ok(cases),
            _ => anyhow::bail!("{} has no \"cases\" array", path.display()),
        },
        _ => anyhow::bail!("{} must contain a JSON array of cases", path.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_cases_accepts_array_and_wrapped_object() {
        let temp_dir = TempDir::new().unwrap();
        let array = temp_dir.path().join("array.json");
        let wrapped = temp_dir.path().join("wrapped.json");
        std::fs::write(&array, r#"[{"in": "1", "out": "2"}]"#).unwrap();
        std::fs::write(&wrapped, r#"{"cases": [1, 2]}"#).unwrap();

        assert_eq!(read_cases(&array).unwrap().len(), 1);
        assert_eq!(read_cases(&wrapped).unwrap().len(), 2);
    }

    #[test]
    fn test_read_cases_rejects_other_shapes() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cases.json");
        std::fs::write(&path, r#"{"tests": []}"#).unwrap();

        assert!(read_cases(&path).is_err());
        assert!(read_cases(&temp_dir.path().join("missing.json")).is_err());
    }
}
