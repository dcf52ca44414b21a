//! Background execution for Classroom.
//!
//! - `dispatcher`: queue worker applying post-commit provisioning events
//! - `tracing_layer`: capture of audit and integrity log events

pub mod dispatcher;
pub mod tracing_layer;

pub use dispatcher::{DispatchStats, ProvisioningDispatcher};
pub use tracing_layer::{AuditEvent, AuditEventLayer};
