//! Wiring of all use cases over one set of repositories.

use crate::membership_usecase::MembershipUseCase;
use crate::session::KeyedLocks;
use crate::{GradeUseCase, Repositories, SessionUseCase, TaskUseCase};
use classroom_core::provision::{ProvisioningSink, TestDefinitionWriter};
use classroom_core::session::Privacy;
use std::sync::Arc;

/// Every use case, sharing repositories, membership locks and session locks.
pub struct ClassroomServices {
    pub sessions: SessionUseCase,
    pub memberships: MembershipUseCase,
    pub tasks: TaskUseCase,
    pub grades: GradeUseCase,
}

impl ClassroomServices {
    pub fn new(
        repositories: Repositories,
        provisioning: Arc<dyn ProvisioningSink>,
        test_writer: Arc<dyn TestDefinitionWriter>,
        default_privacy: Privacy,
    ) -> Self {
        let pair_locks = Arc::new(KeyedLocks::new());
        let session_locks = Arc::new(KeyedLocks::new());
        Self {
            sessions: SessionUseCase::new(
                &repositories,
                provisioning.clone(),
                pair_locks.clone(),
                default_privacy,
            ),
            memberships: MembershipUseCase::new(
                &repositories,
                provisioning,
                pair_locks,
                session_locks.clone(),
            ),
            tasks: TaskUseCase::new(&repositories, test_writer, session_locks),
            grades: GradeUseCase::new(&repositories),
        }
    }
}
