//! Process wiring for the `classroom` binary.

mod bootstrap;
mod logging;

pub use bootstrap::{App, Overrides, load_config};
pub use logging::init_tracing;
