use super::model::{Grade, GradeFilter};
use crate::error::Result;
use async_trait::async_trait;

/// Read access to recorded grades.
#[async_trait]
pub trait GradeRepository: Send + Sync {
    /// Lists grades of tasks in `session_id` matching `filter`.
    async fn list(&self, session_id: &str, filter: &GradeFilter) -> Result<Vec<Grade>>;

    /// Records a grade, replacing the previous one for the same user and task.
    async fn save(&self, grade: &Grade) -> Result<()>;
}
