//! Grade domain module.
//!
//! Grades are recorded by the grading pipeline and are read-only here.

mod model;
mod repository;

pub use model::{Grade, GradeFilter, GradeRecord};
pub use repository::GradeRepository;
