//! Membership domain module.
//!
//! A membership binds exactly one user to exactly one session with exactly
//! one [`Role`]. Storage is keyed by `(session_id, username)`.

mod model;
mod repository;

pub use model::{Membership, Role};
pub use repository::MembershipRepository;
