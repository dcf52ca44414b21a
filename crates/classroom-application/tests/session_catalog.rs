mod common;

use classroom_core::ForbiddenReason;
use classroom_core::grade::{Grade, GradeFilter, GradeRecord, GradeRepository};
use classroom_core::membership::{MembershipRepository, Role};
use classroom_core::session::Privacy;
use common::Fixture;

#[tokio::test]
async fn test_list_public_ignores_privacy_and_honours_hidden() {
    let fx = Fixture::with_users(&["alice"]).await;
    let visible_private = fx.session("alice", Privacy::Private, false).await;
    let hidden_public = fx.session("alice", Privacy::Public, true).await;
    let visible_hidden_privacy = fx.session("alice", Privacy::Hidden, false).await;

    let listed: Vec<String> = fx
        .services
        .sessions
        .list_public()
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.id)
        .collect();

    assert!(listed.contains(&visible_private));
    assert!(listed.contains(&visible_hidden_privacy));
    assert!(!listed.contains(&hidden_public));
}

#[tokio::test]
async fn test_joined_and_invited_views() {
    let fx = Fixture::with_users(&["alice", "bob"]).await;
    let invited_to = fx.session("alice", Privacy::Private, false).await;
    let joined = fx.session("alice", Privacy::Public, false).await;

    fx.services
        .memberships
        .invite(&invited_to, "alice", "bob")
        .await
        .unwrap();
    fx.services.memberships.join(&joined, "bob").await.unwrap();

    let bob_joined = fx.services.sessions.list_joined("bob").await.unwrap();
    assert_eq!(bob_joined.len(), 1);
    assert_eq!(bob_joined[0].summary.id, joined);
    assert_eq!(bob_joined[0].role, Role::Ghost);
    assert_eq!(bob_joined[0].owner, "alice");

    let bob_invited = fx.services.sessions.list_invited("bob").await.unwrap();
    assert_eq!(bob_invited.len(), 1);
    assert_eq!(bob_invited[0].summary.id, invited_to);
    assert_eq!(bob_invited[0].owner, "alice");

    let alice_joined = fx.services.sessions.list_joined("alice").await.unwrap();
    assert_eq!(alice_joined.len(), 2);
    assert!(alice_joined.iter().all(|s| s.role == Role::Owner));

    // Accepting the invitation moves the session between views.
    fx.services.memberships.join(&invited_to, "bob").await.unwrap();
    assert!(fx.services.sessions.list_invited("bob").await.unwrap().is_empty());
    assert_eq!(fx.services.sessions.list_joined("bob").await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_joined_view_serializes_flat() {
    let fx = Fixture::with_users(&["alice"]).await;
    let session_id = fx.session("alice", Privacy::Public, false).await;

    let joined = fx.services.sessions.list_joined("alice").await.unwrap();
    let json = serde_json::to_value(&joined[0]).unwrap();
    assert_eq!(json["id"], session_id.as_str());
    assert_eq!(json["role"], "OWNER");
    assert_eq!(json["owner"], "alice");
}

#[tokio::test]
async fn test_ownerless_session_surfaces_integrity_error() {
    let fx = Fixture::with_users(&["alice"]).await;
    let session_id = fx.session("alice", Privacy::Public, false).await;
    fx.store.upsert(&session_id, "alice", Role::Ghost).await.unwrap();

    let err = fx.services.sessions.list_joined("alice").await.unwrap_err();
    assert!(err.is_integrity_violation());
}

async fn seed_grades(fx: &Fixture, session_id: &str) {
    let grades = [
        ("bob", session_id, 1, 3, 1),
        ("bob", session_id, 2, 0, 4),
        ("carol", session_id, 1, 2, 2),
        ("bob", "other-session", 1, 9, 9),
    ];
    for (user, session, task, correct, wrong) in grades {
        let grade = Grade {
            username: user.to_string(),
            session_id: session.to_string(),
            task_id: task,
            correct,
            wrong,
        };
        GradeRepository::save(fx.store.as_ref(), &grade).await.unwrap();
    }
}

#[tokio::test]
async fn test_list_grades_filters_conjunctively() {
    let fx = Fixture::with_users(&["alice"]).await;
    let session_id = fx.session("alice", Privacy::Public, false).await;
    seed_grades(&fx, &session_id).await;
    let grades = &fx.services.grades;

    let all = grades
        .list_grades(&session_id, "alice", &GradeFilter::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 3);

    let filter = GradeFilter {
        user: Some("bob".into()),
        task: Some(1),
    };
    let bob_task1 = grades.list_grades(&session_id, "alice", &filter).await.unwrap();
    assert_eq!(
        bob_task1,
        vec![GradeRecord {
            user: "bob".into(),
            task: 1,
            correct: 3,
            wrong: 1,
        }]
    );

    let task1 = GradeFilter {
        user: None,
        task: Some(1),
    };
    assert_eq!(
        grades.list_grades(&session_id, "alice", &task1).await.unwrap().len(),
        2
    );
}

#[tokio::test]
async fn test_list_grades_requires_joined_membership() {
    let fx = Fixture::with_users(&["alice", "bob", "dave"]).await;
    let session_id = fx.session("alice", Privacy::Private, false).await;
    fx.services
        .memberships
        .invite(&session_id, "alice", "bob")
        .await
        .unwrap();

    for caller in ["bob", "dave"] {
        let err = fx
            .services
            .grades
            .list_grades(&session_id, caller, &GradeFilter::default())
            .await
            .unwrap_err();
        assert_eq!(err.forbidden_reason(), Some(ForbiddenReason::NotMember));
    }

    let err = fx
        .services
        .grades
        .list_grades("missing", "alice", &GradeFilter::default())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}
