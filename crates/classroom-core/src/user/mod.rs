//! User domain module.
//!
//! Users are created and authenticated outside this crate; the use cases
//! only need to check that a referenced username exists.

mod model;
mod repository;

pub use model::User;
pub use repository::UserRepository;
