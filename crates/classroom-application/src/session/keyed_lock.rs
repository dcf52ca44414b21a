use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex as SyncMutex, PoisonError};
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockTable<K> = Arc<SyncMutex<HashMap<K, Arc<Mutex<()>>>>>;

/// A table of async mutexes, one per key.
///
/// Holding the guard for a key excludes every other holder of the same key
/// while leaving other keys free. Entries are created on first use and
/// removed once the last guard or waiter for the key is gone.
pub struct KeyedLocks<K> {
    locks: LockTable<K>,
}

/// Guard for one key of a [`KeyedLocks`] table.
pub struct KeyedGuard<K>
where
    K: Eq + Hash,
{
    guard: Option<OwnedMutexGuard<()>>,
    key: K,
    locks: LockTable<K>,
}

impl<K> Drop for KeyedGuard<K>
where
    K: Eq + Hash,
{
    fn drop(&mut self) {
        // Release before inspecting the table so the count below only sees
        // the table itself and pending waiters.
        drop(self.guard.take());

        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if locks
            .get(&self.key)
            .is_some_and(|mutex| Arc::strong_count(mutex) == 1)
        {
            locks.remove(&self.key);
        }
    }
}

impl<K> KeyedLocks<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            locks: Arc::new(SyncMutex::new(HashMap::new())),
        }
    }

    /// Waits until the lock for `key` is free and returns its guard.
    pub async fn lock(&self, key: &K) -> KeyedGuard<K> {
        let mutex = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };

        KeyedGuard {
            guard: Some(mutex.lock_owned().await),
            key: key.clone(),
            locks: self.locks.clone(),
        }
    }

    /// Locks several keys in sorted order so concurrent callers cannot deadlock.
    pub async fn lock_many(&self, keys: &[K]) -> Vec<KeyedGuard<K>>
    where
        K: Ord,
    {
        let mut keys = keys.to_vec();
        keys.sort();
        keys.dedup();

        let mut guards = Vec::with_capacity(keys.len());
        for key in &keys {
            guards.push(self.lock(key).await);
        }
        guards
    }

    /// Number of keys currently held or waited on.
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K> Default for KeyedLocks<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_key_is_exclusive() {
        let locks = Arc::new(KeyedLocks::<String>::new());
        let guard = locks.lock(&"s1".to_string()).await;

        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _g = locks.lock(&"s1".to_string()).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_block() {
        let locks = KeyedLocks::<String>::new();
        let _a = locks.lock(&"s1".to_string()).await;
        let _b = locks.lock(&"s2".to_string()).await;
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn test_lock_many_dedups_keys() {
        let locks = KeyedLocks::<String>::new();
        let guards = locks
            .lock_many(&["b".to_string(), "a".to_string(), "b".to_string()])
            .await;
        assert_eq!(guards.len(), 2);
    }

    #[tokio::test]
    async fn test_idle_keys_are_dropped_from_the_table() {
        let locks = KeyedLocks::<(String, String)>::new();
        for user in ["alice", "bob", "carol"] {
            let _g = locks.lock(&("s1".to_string(), user.to_string())).await;
        }
        assert_eq!(locks.len(), 0);

        let held = locks.lock(&("s1".to_string(), "dave".to_string())).await;
        let guards = locks
            .lock_many(&[
                ("s2".to_string(), "erin".to_string()),
                ("s2".to_string(), "frank".to_string()),
            ])
            .await;
        assert_eq!(locks.len(), 3);

        drop(guards);
        assert_eq!(locks.len(), 1);
        drop(held);
        assert!(locks.is_empty());
    }
}
