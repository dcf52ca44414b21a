//! The set of repositories the use cases depend on.

use classroom_core::grade::GradeRepository;
use classroom_core::membership::MembershipRepository;
use classroom_core::session::SessionRepository;
use classroom_core::task::TaskRepository;
use classroom_core::user::UserRepository;
use std::sync::Arc;

/// Handles to every entity repository.
#[derive(Clone)]
pub struct Repositories {
    pub sessions: Arc<dyn SessionRepository>,
    pub users: Arc<dyn UserRepository>,
    pub memberships: Arc<dyn MembershipRepository>,
    pub tasks: Arc<dyn TaskRepository>,
    pub grades: Arc<dyn GradeRepository>,
}

impl Repositories {
    /// Uses one store object for all entity kinds.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: SessionRepository
            + UserRepository
            + MembershipRepository
            + TaskRepository
            + GradeRepository
            + 'static,
    {
        Self {
            sessions: store.clone(),
            users: store.clone(),
            memberships: store.clone(),
            tasks: store.clone(),
            grades: store,
        }
    }
}
