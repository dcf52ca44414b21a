pub mod grades;
pub mod session;
pub mod task;
pub mod user;
pub mod utils;
