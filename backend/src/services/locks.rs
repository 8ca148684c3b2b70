//! Per-(date, item) serialization of ledger mutations
//!
//! Stores only guarantee single-record writes. Every mutating engine
//! operation holds the lock of each key it touches for its whole
//! read-modify-write sequence, so two callers on the same key run one after
//! the other instead of interleaving. Failures halfway through are not
//! rolled back.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use shared::LedgerKey;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Idle entries are pruned once the registry grows past this size
const PRUNE_THRESHOLD: usize = 1024;

#[derive(Debug, Default)]
pub struct KeyLocks {
    locks: Mutex<HashMap<LedgerKey, Arc<AsyncMutex<()>>>>,
}

/// Guards held for the duration of one operation
#[derive(Debug)]
pub struct KeyGuards {
    _guards: Vec<OwnedMutexGuard<()>>,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&self, key: &LedgerKey) -> Arc<AsyncMutex<()>> {
        // The map holds no invariant a panic could break
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        if locks.len() > PRUNE_THRESHOLD {
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        }
        locks.entry(key.clone()).or_default().clone()
    }

    /// Lock every key, always in ascending (date, item) order so that
    /// overlapping callers cannot deadlock.
    pub async fn acquire(&self, keys: impl IntoIterator<Item = LedgerKey>) -> KeyGuards {
        let mut keys: Vec<LedgerKey> = keys.into_iter().collect();
        keys.sort();
        keys.dedup();

        let mut guards = Vec::with_capacity(keys.len());
        for key in &keys {
            guards.push(self.handle(key).lock_owned().await);
        }

        KeyGuards { _guards: guards }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.lock().map(|l| l.len()).unwrap_or(0)
    }
}
