//! Session domain module.
//!
//! # Module Structure
//!
//! - `model`: Core session entity (`Session`) and its `Privacy` level
//! - `roster`: A session loaded together with its memberships (`SessionRoster`)
//! - `repository`: Repository trait for session persistence
//!
//! # Usage
//!
//! ```ignore
//! use classroom_core::session::{Privacy, Session, SessionRepository, SessionRoster};
//! ```

mod model;
mod repository;
mod roster;

// Re-export public API
pub use model::{Privacy, Session, SessionSummary};
pub use repository::SessionRepository;
pub use roster::SessionRoster;
