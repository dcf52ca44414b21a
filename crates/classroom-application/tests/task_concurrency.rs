mod common;

use async_trait::async_trait;
use classroom_application::{ClassroomServices, Repositories};
use classroom_core::provision::TestDefinitionWriter;
use classroom_core::session::Privacy;
use classroom_core::task::{TaskRepository, TaskSpec};
use classroom_core::{ClassroomError, ForbiddenReason};
use common::{Fixture, RecordingSink, RecordingWriter, store_with_users};
use futures::future::join_all;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Writer that fails its first call and records the rest.
#[derive(Default)]
struct FlakyWriter {
    failed: AtomicBool,
    inner: RecordingWriter,
}

#[async_trait]
impl TestDefinitionWriter for FlakyWriter {
    async fn write_cases(
        &self,
        session_id: &str,
        task_id: u32,
        cases: &[Value],
    ) -> classroom_core::Result<()> {
        if !self.failed.swap(true, Ordering::SeqCst) {
            return Err(ClassroomError::io("disk full"));
        }
        self.inner.write_cases(session_id, task_id, cases).await
    }
}

fn spec(name: &str) -> TaskSpec {
    TaskSpec {
        name: Some(name.to_string()),
        description: Some(format!("{} description", name)),
        hints: None,
        cases: Some(vec![json!({"input": "1 2", "output": "3"})]),
    }
}

#[tokio::test]
async fn test_concurrent_create_task_assigns_sequential_ids() {
    let fx = Fixture::with_users(&["alice"]).await;
    let session_id = fx.session("alice", Privacy::Public, false).await;

    let results = join_all((0..12).map(|i| {
        fx.services
            .tasks
            .create_task(&session_id, "alice", spec(&format!("task-{}", i)))
    }))
    .await;

    let mut ids: Vec<u32> = results.into_iter().map(|r| r.unwrap().id).collect();
    ids.sort_unstable();
    assert_eq!(ids, (1..=12).collect::<Vec<_>>());

    let stored = fx.store.list_by_session(&session_id).await.unwrap();
    assert_eq!(stored.len(), 12);
    assert_eq!(fx.writer.writes.lock().unwrap().len(), 12);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_create_task_across_threads() {
    let fx = Arc::new(Fixture::with_users(&["alice"]).await);
    let session_id = fx.session("alice", Privacy::Public, false).await;

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let fx = fx.clone();
            let session_id = session_id.clone();
            tokio::spawn(async move {
                fx.services
                    .tasks
                    .create_task(&session_id, "alice", spec(&format!("task-{}", i)))
                    .await
                    .map(|task| task.id)
            })
        })
        .collect();

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap().unwrap());
    }
    ids.sort_unstable();
    assert_eq!(ids, (1..=8).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_task_ids_are_scoped_per_session() {
    let fx = Fixture::with_users(&["alice"]).await;
    let first = fx.session("alice", Privacy::Public, false).await;
    let second = fx.session("alice", Privacy::Public, false).await;

    let a = fx.services.tasks.create_task(&first, "alice", spec("a")).await.unwrap();
    let b = fx.services.tasks.create_task(&second, "alice", spec("b")).await.unwrap();
    let c = fx.services.tasks.create_task(&first, "alice", spec("c")).await.unwrap();

    assert_eq!((a.id, b.id, c.id), (1, 1, 2));
    assert_eq!(a.name, "a");
    assert_eq!(a.description, "a description");
    assert!(a.hints.is_empty());

    let writes = fx.writer.writes.lock().unwrap().clone();
    assert_eq!(writes[2], (first.clone(), 2, 1));
}

#[tokio::test]
async fn test_create_task_requires_owner_and_cases() {
    let fx = Fixture::with_users(&["alice", "bob"]).await;
    let session_id = fx.session("alice", Privacy::Public, false).await;
    fx.services.memberships.join(&session_id, "bob").await.unwrap();

    let err = fx
        .services
        .tasks
        .create_task(&session_id, "bob", spec("x"))
        .await
        .unwrap_err();
    assert_eq!(err.forbidden_reason(), Some(ForbiddenReason::NotOwner));

    let mut empty = spec("y");
    empty.cases = Some(Vec::new());
    let err = fx
        .services
        .tasks
        .create_task(&session_id, "alice", empty)
        .await
        .unwrap_err();
    assert!(matches!(err, ClassroomError::MissingField(ref f) if f == "cases"));

    let err = fx
        .services
        .tasks
        .create_task("missing", "alice", spec("z"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    // Refused creations never consume an id.
    let task = fx
        .services
        .tasks
        .create_task(&session_id, "alice", spec("ok"))
        .await
        .unwrap();
    assert_eq!(task.id, 1);
}

#[tokio::test]
async fn test_failed_case_write_leaves_no_task_and_no_gap() {
    let store = store_with_users(&["alice"]).await;
    let writer = Arc::new(FlakyWriter::default());
    let services = ClassroomServices::new(
        Repositories::from_store(store.clone()),
        Arc::new(RecordingSink::default()),
        writer.clone(),
        Privacy::Public,
    );
    let session_id = services
        .sessions
        .create_session(
            "alice",
            classroom_application::CreateSessionRequest {
                sname: Some("Loops".to_string()),
                privacy: Some(Privacy::Public),
                description: None,
                hidden: Some(false),
            },
        )
        .await
        .unwrap()
        .id;

    let err = services
        .tasks
        .create_task(&session_id, "alice", spec("first"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClassroomError::Io { .. }));
    assert!(store.list_by_session(&session_id).await.unwrap().is_empty());

    let task = services
        .tasks
        .create_task(&session_id, "alice", spec("first"))
        .await
        .unwrap();
    assert_eq!(task.id, 1);
    assert_eq!(store.list_by_session(&session_id).await.unwrap().len(), 1);
    assert_eq!(
        writer.inner.writes.lock().unwrap().clone(),
        vec![(session_id.clone(), 1, 1)]
    );
}
