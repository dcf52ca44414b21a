use super::utils::{print_json, require_caller};
use crate::app::App;
use anyhow::Result;
use classroom_core::grade::GradeFilter;

pub async fn list(
    app: &App,
    caller: Option<&str>,
    session_id: &str,
    user: Option<String>,
    task: Option<u32>,
) -> Result<()> {
    let caller = require_caller(caller)?;
    let filter = GradeFilter { user, task };
    let grades = app
        .services
        .grades
        .list_grades(session_id, caller, &filter)
        .await?;
    print_json(&grades)
}
