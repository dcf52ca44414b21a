use anyhow::{Context, Result};
use classroom_core::config::ClassroomConfig;
use classroom_execution::{AuditEvent, AuditEventLayer};
use tokio::sync::mpsc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global subscriber.
///
/// `RUST_LOG` wins over the configured `log_level`. Logs go to stderr so
/// stdout stays machine readable. With `audit` set, audit and integrity
/// events are additionally captured and returned through the receiver.
pub fn init_tracing(
    config: &ClassroomConfig,
    audit: bool,
) -> Result<Option<mpsc::UnboundedReceiver<AuditEvent>>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .with_context(|| format!("Invalid log_level '{}'", config.log_level))?;

    let (audit_layer, receiver) = if audit {
        let (layer, receiver) = AuditEventLayer::channel();
        (Some(layer), Some(receiver))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(audit_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(receiver)
}
