use serde::{Deserialize, Serialize};

/// Outcome counts of one user's submissions for one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grade {
    pub username: String,
    pub session_id: String,
    pub task_id: u32,
    pub correct: u32,
    pub wrong: u32,
}

/// Conjunctive filter over grades; `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeFilter {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub task: Option<u32>,
}

impl GradeFilter {
    pub fn matches(&self, grade: &Grade) -> bool {
        self.user.as_deref().is_none_or(|u| u == grade.username)
            && self.task.is_none_or(|t| t == grade.task_id)
    }
}

/// A grade as reported to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeRecord {
    pub user: String,
    pub task: u32,
    pub correct: u32,
    pub wrong: u32,
}

impl From<Grade> for GradeRecord {
    fn from(grade: Grade) -> Self {
        Self {
            user: grade.username,
            task: grade.task_id,
            correct: grade.correct,
            wrong: grade.wrong,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grade(user: &str, task: u32) -> Grade {
        Grade {
            username: user.to_string(),
            session_id: "s1".to_string(),
            task_id: task,
            correct: 2,
            wrong: 1,
        }
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let filter = GradeFilter::default();
        assert!(filter.matches(&grade("alice", 1)));
        assert!(filter.matches(&grade("bob", 7)));
    }

    #[test]
    fn test_filter_fields_are_conjunctive() {
        let filter = GradeFilter {
            user: Some("alice".into()),
            task: Some(2),
        };
        assert!(filter.matches(&grade("alice", 2)));
        assert!(!filter.matches(&grade("alice", 1)));
        assert!(!filter.matches(&grade("bob", 2)));
    }
}
