//! In-process registry of real-time session namespaces.

use async_trait::async_trait;
use classroom_core::error::Result;
use classroom_core::provision::NamespaceNotifier;
use std::collections::HashMap;
use tokio::sync::{RwLock, broadcast};

const CHANNEL_CAPACITY: usize = 64;

/// Holds one broadcast channel per namespace `/<session_id>`.
pub struct InMemoryNamespaceRegistry {
    namespaces: RwLock<HashMap<String, broadcast::Sender<String>>>,
}

impl InMemoryNamespaceRegistry {
    pub fn new() -> Self {
        Self {
            namespaces: RwLock::new(HashMap::new()),
        }
    }

    pub fn namespace_for(session_id: &str) -> String {
        format!("/{}", session_id)
    }

    /// Subscribes to a registered namespace.
    pub async fn subscribe(&self, namespace: &str) -> Option<broadcast::Receiver<String>> {
        let namespaces = self.namespaces.read().await;
        namespaces.get(namespace).map(broadcast::Sender::subscribe)
    }

    /// Registered namespaces in sorted order.
    pub async fn namespaces(&self) -> Vec<String> {
        let namespaces = self.namespaces.read().await;
        let mut names: Vec<String> = namespaces.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for InMemoryNamespaceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NamespaceNotifier for InMemoryNamespaceRegistry {
    async fn ensure_namespace(&self, session_id: &str) -> Result<()> {
        let namespace = Self::namespace_for(session_id);
        let mut namespaces = self.namespaces.write().await;
        if !namespaces.contains_key(&namespace) {
            let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
            namespaces.insert(namespace.clone(), sender);
            tracing::debug!("[InMemoryNamespaceRegistry] Registered namespace {}", namespace);
        }
        Ok(())
    }
}
