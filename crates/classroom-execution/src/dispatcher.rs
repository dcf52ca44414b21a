//! Asynchronous provisioning of workspaces and namespaces.
//!
//! Use cases hand [`ProvisioningEvent`]s to the dispatcher after their
//! membership transition has been written. A single tokio task applies them
//! in order; failures are logged and counted, never retried.

use classroom_core::error::{ClassroomError, Result};
use classroom_core::provision::{
    NamespaceNotifier, ProvisioningEvent, ProvisioningSink, WorkspaceProvisioner,
};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Counters of processed events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub applied: u64,
    pub failed: u64,
}

#[derive(Default)]
struct Counters {
    applied: AtomicU64,
    failed: AtomicU64,
}

impl Counters {
    fn stats(&self) -> DispatchStats {
        DispatchStats {
            applied: self.applied.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
        }
    }
}

pub struct ProvisioningDispatcher {
    sender: mpsc::UnboundedSender<ProvisioningEvent>,
    cancel: CancellationToken,
    worker: Mutex<Option<JoinHandle<()>>>,
    counters: Arc<Counters>,
}

impl ProvisioningDispatcher {
    /// Starts the worker task on the current tokio runtime.
    pub fn spawn(
        provisioner: Arc<dyn WorkspaceProvisioner>,
        namespaces: Arc<dyn NamespaceNotifier>,
    ) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let counters = Arc::new(Counters::default());

        let worker = tokio::spawn(run_worker(
            receiver,
            cancel.clone(),
            provisioner,
            namespaces,
            counters.clone(),
        ));

        Self {
            sender,
            cancel,
            worker: Mutex::new(Some(worker)),
            counters,
        }
    }

    pub fn stats(&self) -> DispatchStats {
        self.counters.stats()
    }

    /// Stops accepting events, applies everything already queued and waits
    /// for the worker to exit.
    pub async fn shutdown(&self) -> DispatchStats {
        self.cancel.cancel();

        let worker = self.worker.lock().ok().and_then(|mut guard| guard.take());
        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                tracing::error!("[ProvisioningDispatcher] Worker terminated abnormally: {}", e);
            }
        }

        self.stats()
    }
}

impl ProvisioningSink for ProvisioningDispatcher {
    fn dispatch(&self, event: ProvisioningEvent) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(ClassroomError::internal("provisioning dispatcher is shut down"));
        }
        self.sender
            .send(event)
            .map_err(|_| ClassroomError::internal("provisioning queue is closed"))
    }
}

async fn run_worker(
    mut receiver: mpsc::UnboundedReceiver<ProvisioningEvent>,
    cancel: CancellationToken,
    provisioner: Arc<dyn WorkspaceProvisioner>,
    namespaces: Arc<dyn NamespaceNotifier>,
    counters: Arc<Counters>,
) {
    tracing::debug!("[ProvisioningDispatcher] Worker started");

    loop {
        tokio::select! {
            biased;
            event = receiver.recv() => match event {
                Some(event) => apply(&event, &*provisioner, &*namespaces, &counters).await,
                None => break,
            },
            _ = cancel.cancelled() => {
                receiver.close();
                while let Some(event) = receiver.recv().await {
                    apply(&event, &*provisioner, &*namespaces, &counters).await;
                }
                break;
            }
        }
    }

    tracing::debug!("[ProvisioningDispatcher] Worker stopped");
}

async fn apply(
    event: &ProvisioningEvent,
    provisioner: &dyn WorkspaceProvisioner,
    namespaces: &dyn NamespaceNotifier,
    counters: &Counters,
) {
    let result = async {
        if let ProvisioningEvent::SessionCreated { session_id, .. } = event {
            provisioner.prepare_session(session_id).await?;
        }
        provisioner
            .provision(event.session_id(), event.username())
            .await?;
        namespaces.ensure_namespace(event.session_id()).await
    }
    .await;

    match result {
        Ok(()) => {
            counters.applied.fetch_add(1, Ordering::SeqCst);
            tracing::debug!("[ProvisioningDispatcher] Applied {:?}", event);
        }
        Err(e) => {
            counters.failed.fetch_add(1, Ordering::SeqCst);
            tracing::error!("[ProvisioningDispatcher] Failed to apply {:?}: {}", event, e);
        }
    }
}
