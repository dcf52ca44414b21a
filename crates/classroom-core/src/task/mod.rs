//! Task domain module.
//!
//! # Module Structure
//!
//! - `model`: Graded task entity (`Task`) and the creation request (`TaskSpec`)
//! - `repository`: Task persistence with per-session id allocation

mod model;
pub mod repository;

pub use model::{Task, TaskSpec};
pub use repository::TaskRepository;
