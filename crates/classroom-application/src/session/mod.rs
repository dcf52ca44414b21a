//! Session application helpers shared by the use cases.
//!
//! - `KeyedLocks`: per-key async mutexes serializing read-decide-write steps
//! - `RosterLoader`: loads a session with its memberships

mod keyed_lock;
mod roster_loader;

pub use keyed_lock::{KeyedGuard, KeyedLocks};
pub use roster_loader::RosterLoader;
