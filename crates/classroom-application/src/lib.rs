//! Application layer for Classroom.
//!
//! Use cases coordinating the domain policy with the repositories and the
//! provisioning collaborators.

pub mod grade_usecase;
pub mod membership_usecase;
mod repositories;
mod services;
pub mod session;
pub mod session_usecase;
pub mod task_usecase;

pub use grade_usecase::GradeUseCase;
pub use membership_usecase::MembershipUseCase;
pub use repositories::Repositories;
pub use services::ClassroomServices;
pub use session_usecase::{CreateSessionRequest, InvitedSession, JoinedSession, SessionUseCase};
pub use task_usecase::TaskUseCase;
