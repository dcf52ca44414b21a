//! Domain layer for Classroom.
//!
//! Shared coding sessions: who may see a session, who may join it, which
//! role each member holds and which privileged actions a role may perform.

pub mod access;
pub mod config;
pub mod error;
pub mod grade;
pub mod membership;
pub mod provision;
pub mod session;
pub mod task;
pub mod user;

// Re-export common error type
pub use error::{ClassroomError, ForbiddenReason, Result};
