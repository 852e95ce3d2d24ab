use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Per-key exclusive locks, standing in for row-level locking.
///
/// Holding a [`RowGuard`] for a key serializes every other operation on the
/// same key. Different keys never block each other.
pub struct RowLocks<K> {
    slots: Mutex<HashMap<K, Arc<AsyncMutex<()>>>>,
}

impl<K> Default for RowLocks<K> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

/// Proof that the lock for `key` is held. Released on drop.
pub struct RowGuard<K> {
    key: K,
    _guard: OwnedMutexGuard<()>,
}

impl<K: Copy> RowGuard<K> {
    pub fn key(&self) -> K {
        self.key
    }
}

impl<K: Eq + Hash + Copy> RowLocks<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, key: K) -> RowGuard<K> {
        let slot = {
            let mut slots = self
                .slots
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            // Slots nobody holds or waits on are only referenced by the map.
            slots.retain(|_, slot| Arc::strong_count(slot) > 1);
            Arc::clone(slots.entry(key).or_default())
        };
        RowGuard {
            key,
            _guard: slot.lock_owned().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_key_is_exclusive() {
        let locks = Arc::new(RowLocks::<u64>::new());
        let guard = locks.acquire(1).await;

        let contender = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move { locks.acquire(1).await.key() })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        assert_eq!(contender.await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_different_keys_do_not_block() {
        let locks = RowLocks::<u64>::new();
        let _first = locks.acquire(1).await;
        let second = tokio::time::timeout(Duration::from_millis(100), locks.acquire(2)).await;
        assert!(second.is_ok());
    }
}
