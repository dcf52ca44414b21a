//! Access control decisions.
//!
//! Everything in this module is pure: it inspects already-loaded data and
//! never touches storage.

mod policy;

pub use policy::{AUDIT_TARGET, AccessPolicy, INTEGRITY_TARGET};
