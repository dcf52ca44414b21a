//! Grade ledger queries.

use crate::session::RosterLoader;
use crate::Repositories;
use classroom_core::access::AUDIT_TARGET;
use classroom_core::error::{ClassroomError, ForbiddenReason, Result};
use classroom_core::grade::{GradeFilter, GradeRecord, GradeRepository};
use std::sync::Arc;

pub struct GradeUseCase {
    roster_loader: RosterLoader,
    grades: Arc<dyn GradeRepository>,
}

impl GradeUseCase {
    pub fn new(repositories: &Repositories) -> Self {
        Self {
            roster_loader: RosterLoader::new(
                repositories.sessions.clone(),
                repositories.memberships.clone(),
            ),
            grades: repositories.grades.clone(),
        }
    }

    /// Lists grades of the session's tasks matching `filter`.
    ///
    /// # Errors
    ///
    /// - `UnknownSession` if the session is missing
    /// - `Forbidden(NotMember)` unless `caller` has joined the session
    pub async fn list_grades(
        &self,
        session_id: &str,
        caller: &str,
        filter: &GradeFilter,
    ) -> Result<Vec<GradeRecord>> {
        let roster = self.roster_loader.load(session_id).await?;

        let joined = roster
            .membership_of(caller)
            .is_some_and(|m| m.role.has_joined());
        if !joined {
            tracing::warn!(
                target: AUDIT_TARGET,
                session_id,
                caller,
                action = "list_grades",
                "refused: caller is not a member"
            );
            return Err(ClassroomError::forbidden(ForbiddenReason::NotMember));
        }

        let grades = self.grades.list(session_id, filter).await?;
        Ok(grades.into_iter().map(GradeRecord::from).collect())
    }
}
