#![allow(dead_code)]

use async_trait::async_trait;
use classroom_application::{ClassroomServices, CreateSessionRequest, Repositories};
use classroom_core::error::Result;
use classroom_core::provision::{ProvisioningEvent, ProvisioningSink, TestDefinitionWriter};
use classroom_core::session::{Privacy, Session, SessionRepository};
use classroom_core::user::{User, UserRepository};
use classroom_infrastructure::InMemoryEntityStore;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tokio::sync::{Notify, oneshot};

/// Sink that keeps every dispatched event in memory.
#[derive(Default)]
pub struct RecordingSink {
    pub events: Mutex<Vec<ProvisioningEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<ProvisioningEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl ProvisioningSink for RecordingSink {
    fn dispatch(&self, event: ProvisioningEvent) -> Result<()> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

/// Writer that records `(session_id, task_id, case count)`.
#[derive(Default)]
pub struct RecordingWriter {
    pub writes: Mutex<Vec<(String, u32, usize)>>,
}

#[async_trait]
impl TestDefinitionWriter for RecordingWriter {
    async fn write_cases(&self, session_id: &str, task_id: u32, cases: &[Value]) -> Result<()> {
        self.writes
            .lock()
            .unwrap()
            .push((session_id.to_string(), task_id, cases.len()));
        Ok(())
    }
}

/// Session repository whose next `find_by_id` parks until released.
pub struct GatedSessions {
    inner: Arc<InMemoryEntityStore>,
    gate: Mutex<Option<oneshot::Receiver<()>>>,
    pub entered: Notify,
}

impl GatedSessions {
    pub fn new(inner: Arc<InMemoryEntityStore>) -> Self {
        Self {
            inner,
            gate: Mutex::new(None),
            entered: Notify::new(),
        }
    }

    /// Parks the next lookup; sending on the returned channel releases it.
    pub fn arm(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.gate.lock().unwrap() = Some(rx);
        tx
    }
}

#[async_trait]
impl SessionRepository for GatedSessions {
    async fn find_by_id(&self, session_id: &str) -> Result<Option<Session>> {
        let gate = self.gate.lock().unwrap().take();
        if let Some(rx) = gate {
            self.entered.notify_one();
            let _ = rx.await;
        }
        SessionRepository::find_by_id(self.inner.as_ref(), session_id).await
    }

    async fn save(&self, session: &Session) -> Result<()> {
        SessionRepository::save(self.inner.as_ref(), session).await
    }

    async fn list_all(&self) -> Result<Vec<Session>> {
        SessionRepository::list_all(self.inner.as_ref()).await
    }
}

/// Registers `usernames` in a fresh store.
pub async fn store_with_users(usernames: &[&str]) -> Arc<InMemoryEntityStore> {
    let store = Arc::new(InMemoryEntityStore::new());
    for username in usernames {
        UserRepository::save(store.as_ref(), &User::new(*username))
            .await
            .unwrap();
    }
    store
}

pub struct Fixture {
    pub store: Arc<InMemoryEntityStore>,
    pub services: ClassroomServices,
    pub sink: Arc<RecordingSink>,
    pub writer: Arc<RecordingWriter>,
}

impl Fixture {
    /// Services over an empty store with the given users registered.
    pub async fn with_users(usernames: &[&str]) -> Self {
        let store = store_with_users(usernames).await;
        let sink = Arc::new(RecordingSink::default());
        let writer = Arc::new(RecordingWriter::default());
        let services = ClassroomServices::new(
            Repositories::from_store(store.clone()),
            sink.clone(),
            writer.clone(),
            Privacy::Public,
        );

        Self {
            store,
            services,
            sink,
            writer,
        }
    }

    /// Creates a session owned by `owner` and returns its id.
    pub async fn session(&self, owner: &str, privacy: Privacy, hidden: bool) -> String {
        let request = CreateSessionRequest {
            sname: Some(format!("{}'s session", owner)),
            privacy: Some(privacy),
            description: None,
            hidden: Some(hidden),
        };
        self.services
            .sessions
            .create_session(owner, request)
            .await
            .unwrap()
            .id
    }
}
