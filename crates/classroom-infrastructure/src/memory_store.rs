//! In-memory entity store implementing every repository trait.
//!
//! All entity kinds live behind one `RwLock`, so each repository call is a
//! single atomic read or read-modify-write. The whole state can be exported
//! as an [`EntitySnapshot`] and restored from one.

use async_trait::async_trait;
use classroom_core::error::Result;
use classroom_core::grade::{Grade, GradeFilter, GradeRepository};
use classroom_core::membership::{Membership, MembershipRepository, Role};
use classroom_core::session::{Session, SessionRepository};
use classroom_core::task::{Task, TaskRepository};
use classroom_core::user::{User, UserRepository};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

/// Serializable image of the whole store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntitySnapshot {
    pub sessions: Vec<Session>,
    pub users: Vec<User>,
    pub memberships: Vec<Membership>,
    pub tasks: Vec<Task>,
    pub grades: Vec<Grade>,
    /// Last task id handed out per session
    pub task_counters: BTreeMap<String, u32>,
    pub next_membership_id: u64,
}

type MembershipKey = (String, String);
type TaskKey = (String, u32);
type GradeKey = (String, u32, String);

#[derive(Default)]
struct StoreState {
    sessions: HashMap<String, Session>,
    users: HashMap<String, User>,
    memberships: HashMap<MembershipKey, Membership>,
    tasks: BTreeMap<TaskKey, Task>,
    grades: BTreeMap<GradeKey, Grade>,
    task_counters: HashMap<String, u32>,
    next_membership_id: u64,
}

impl StoreState {
    fn next_membership_id(&mut self) -> u64 {
        self.next_membership_id += 1;
        self.next_membership_id
    }

    /// Updates the row for the pair in place, or inserts one.
    fn set_role(&mut self, session_id: &str, username: &str, role: Role) -> Membership {
        let key = (session_id.to_string(), username.to_string());

        if let Some(existing) = self.memberships.get_mut(&key) {
            existing.role = role;
            existing.updated_at = chrono::Utc::now().to_rfc3339();
            return existing.clone();
        }

        let stored = Membership {
            id: self.next_membership_id(),
            ..Membership::new(session_id, username, role)
        };
        self.memberships.insert(key, stored.clone());
        stored
    }

    fn sorted_memberships<F>(&self, predicate: F) -> Vec<Membership>
    where
        F: Fn(&Membership) -> bool,
    {
        let mut rows: Vec<Membership> = self
            .memberships
            .values()
            .filter(|m| predicate(m))
            .cloned()
            .collect();
        rows.sort_by_key(|m| m.id);
        rows
    }
}

/// Entity store kept entirely in memory.
#[derive(Default)]
pub struct InMemoryEntityStore {
    state: RwLock<StoreState>,
}

impl InMemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a store from a snapshot.
    ///
    /// Membership rows sharing a `(session, user)` key collapse to the one
    /// with the lowest id, and counters never fall behind stored ids.
    pub fn from_snapshot(snapshot: EntitySnapshot) -> Self {
        let mut state = StoreState {
            next_membership_id: snapshot.next_membership_id,
            ..StoreState::default()
        };

        for session in snapshot.sessions {
            state.sessions.insert(session.id.clone(), session);
        }
        for user in snapshot.users {
            state.users.insert(user.username.clone(), user);
        }

        let mut memberships = snapshot.memberships;
        memberships.sort_by_key(|m| m.id);
        for membership in memberships {
            state.next_membership_id = state.next_membership_id.max(membership.id);
            let key = (membership.session_id.clone(), membership.username.clone());
            if state.memberships.contains_key(&key) {
                tracing::warn!(
                    "[InMemoryEntityStore] Dropping duplicate membership {} for {:?}",
                    membership.id,
                    key
                );
                continue;
            }
            state.memberships.insert(key, membership);
        }

        for (session_id, counter) in snapshot.task_counters {
            state.task_counters.insert(session_id, counter);
        }
        for task in snapshot.tasks {
            let counter = state.task_counters.entry(task.session_id.clone()).or_insert(0);
            *counter = (*counter).max(task.id);
            state.tasks.insert((task.session_id.clone(), task.id), task);
        }
        for grade in snapshot.grades {
            let key = (grade.session_id.clone(), grade.task_id, grade.username.clone());
            state.grades.insert(key, grade);
        }

        Self {
            state: RwLock::new(state),
        }
    }

    /// Exports the current state.
    pub async fn snapshot(&self) -> EntitySnapshot {
        let state = self.state.read().await;

        let mut sessions: Vec<Session> = state.sessions.values().cloned().collect();
        sessions.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        let mut users: Vec<User> = state.users.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));

        EntitySnapshot {
            sessions,
            users,
            memberships: state.sorted_memberships(|_| true),
            tasks: state.tasks.values().cloned().collect(),
            grades: state.grades.values().cloned().collect(),
            task_counters: state
                .task_counters
                .iter()
                .map(|(k, v)| (k.clone(), *v))
                .collect(),
            next_membership_id: state.next_membership_id,
        }
    }
}

#[async_trait]
impl SessionRepository for InMemoryEntityStore {
    async fn find_by_id(&self, session_id: &str) -> Result<Option<Session>> {
        Ok(self.state.read().await.sessions.get(session_id).cloned())
    }

    async fn save(&self, session: &Session) -> Result<()> {
        let mut state = self.state.write().await;
        state.sessions.insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Session>> {
        let state = self.state.read().await;
        let mut sessions: Vec<Session> = state.sessions.values().cloned().collect();
        sessions.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(sessions)
    }
}

#[async_trait]
impl UserRepository for InMemoryEntityStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self.state.read().await.users.get(username).cloned())
    }

    async fn save(&self, user: &User) -> Result<()> {
        let mut state = self.state.write().await;
        state.users.insert(user.username.clone(), user.clone());
        Ok(())
    }
}

#[async_trait]
impl MembershipRepository for InMemoryEntityStore {
    async fn find(&self, session_id: &str, username: &str) -> Result<Option<Membership>> {
        let state = self.state.read().await;
        Ok(state
            .memberships
            .get(&(session_id.to_string(), username.to_string()))
            .cloned())
    }

    async fn insert_if_absent(&self, membership: Membership) -> Result<(Membership, bool)> {
        let mut state = self.state.write().await;
        let key = (membership.session_id.clone(), membership.username.clone());

        if let Some(existing) = state.memberships.get(&key) {
            return Ok((existing.clone(), false));
        }

        let stored = Membership {
            id: state.next_membership_id(),
            ..membership
        };
        state.memberships.insert(key, stored.clone());
        Ok((stored, true))
    }

    async fn upsert(&self, session_id: &str, username: &str, role: Role) -> Result<Membership> {
        let mut state = self.state.write().await;
        Ok(state.set_role(session_id, username, role))
    }

    async fn transfer_ownership(
        &self,
        session_id: &str,
        previous_owner: &str,
        next_owner: &str,
    ) -> Result<Membership> {
        let mut state = self.state.write().await;
        let owner = state.set_role(session_id, next_owner, Role::Owner);
        if previous_owner != next_owner {
            state.set_role(session_id, previous_owner, Role::Ghost);
        }
        Ok(owner)
    }

    async fn list_by_session(&self, session_id: &str) -> Result<Vec<Membership>> {
        let state = self.state.read().await;
        Ok(state.sorted_memberships(|m| m.session_id == session_id))
    }

    async fn list_by_user(&self, username: &str) -> Result<Vec<Membership>> {
        let state = self.state.read().await;
        Ok(state.sorted_memberships(|m| m.username == username))
    }
}

#[async_trait]
impl TaskRepository for InMemoryEntityStore {
    async fn allocate_id(&self, session_id: &str) -> Result<u32> {
        let mut state = self.state.write().await;
        let counter = state.task_counters.entry(session_id.to_string()).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }

    async fn save(&self, task: &Task) -> Result<()> {
        let mut state = self.state.write().await;
        let counter = state.task_counters.entry(task.session_id.clone()).or_insert(0);
        *counter = (*counter).max(task.id);
        state
            .tasks
            .insert((task.session_id.clone(), task.id), task.clone());
        Ok(())
    }

    async fn release_id(&self, session_id: &str, task_id: u32) -> Result<()> {
        let mut state = self.state.write().await;
        let stored = state.tasks.contains_key(&(session_id.to_string(), task_id));
        if let Some(counter) = state.task_counters.get_mut(session_id) {
            if *counter == task_id && !stored {
                *counter -= 1;
            }
        }
        Ok(())
    }

    async fn list_by_session(&self, session_id: &str) -> Result<Vec<Task>> {
        let state = self.state.read().await;
        Ok(state
            .tasks
            .values()
            .filter(|t| t.session_id == session_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl GradeRepository for InMemoryEntityStore {
    async fn list(&self, session_id: &str, filter: &GradeFilter) -> Result<Vec<Grade>> {
        let state = self.state.read().await;
        Ok(state
            .grades
            .values()
            .filter(|g| g.session_id == session_id && filter.matches(g))
            .cloned()
            .collect())
    }

    async fn save(&self, grade: &Grade) -> Result<()> {
        let mut state = self.state.write().await;
        let key = (grade.session_id.clone(), grade.task_id, grade.username.clone());
        state.grades.insert(key, grade.clone());
        Ok(())
    }
}
