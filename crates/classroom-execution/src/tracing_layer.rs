//! Tracing layer capturing access-control audit events.
//!
//! Events logged on the `classroom::audit` (refusals) and
//! `classroom::integrity` (owner invariant violations) targets are copied
//! into [`AuditEvent`]s and sent over a tokio channel. Everything else is
//! ignored.

use classroom_core::access::{AUDIT_TARGET, INTEGRITY_TARGET};
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{Event, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

/// A captured audit or integrity log record.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AuditEvent {
    /// `classroom::audit` or `classroom::integrity`
    pub target: String,
    /// Log level (INFO, WARN, ERROR, ...)
    pub level: String,
    pub message: String,
    /// Structured fields (session_id, caller, action, ...)
    pub fields: HashMap<String, Value>,
    pub timestamp: String,
}

impl AuditEvent {
    pub fn is_integrity_violation(&self) -> bool {
        self.target == INTEGRITY_TARGET
    }
}

/// Layer forwarding audit events to a channel.
pub struct AuditEventLayer {
    sender: mpsc::UnboundedSender<AuditEvent>,
}

impl AuditEventLayer {
    pub fn new(sender: mpsc::UnboundedSender<AuditEvent>) -> Self {
        Self { sender }
    }

    /// Creates a layer together with the receiving end of its channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<AuditEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(sender), receiver)
    }

    fn is_audited(target: &str) -> bool {
        target == AUDIT_TARGET || target == INTEGRITY_TARGET
    }
}

impl<S> Layer<S> for AuditEventLayer
where
    S: Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let target = event.metadata().target();
        if !Self::is_audited(target) {
            return;
        }

        let mut fields = HashMap::new();
        event.record(&mut FieldVisitor(&mut fields));

        let message = match fields.remove("message") {
            Some(Value::String(s)) => s,
            Some(other) => other.to_string(),
            None => String::new(),
        };

        let audit_event = AuditEvent {
            target: target.to_string(),
            level: event.metadata().level().to_string(),
            message,
            fields,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        // Receiver may be gone; auditing must never fail the caller.
        let _ = self.sender.send(audit_event);
    }
}

/// Field visitor that extracts tracing event fields into a HashMap
struct FieldVisitor<'a>(&'a mut HashMap<String, Value>);

impl tracing::field::Visit for FieldVisitor<'_> {
    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.insert(
            field.name().to_string(),
            serde_json::json!(format!("{:?}", value)),
        );
    }
}
