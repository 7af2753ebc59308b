use crate::domain::ports::{StateAccessor, Versioned};
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// An event published on the store's notification channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedEvent {
    pub name: String,
    pub payload: Vec<u8>,
}

#[derive(Debug, Clone)]
struct Entry {
    value: Vec<u8>,
    version: u64,
}

/// A thread-safe in-memory state store.
///
/// Every write bumps the key's version, so this store supports optimistic
/// writes. Emitted events are kept in order for inspection. Clones share state.
#[derive(Default, Clone)]
pub struct InMemoryStateStore {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
    events: Arc<RwLock<Vec<EmittedEvent>>>,
    writes: Arc<AtomicUsize>,
}

impl InMemoryStateStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a value without counting it as a ledger write. Used to seed fixtures.
    pub async fn insert_raw(&self, key: &str, value: Vec<u8>) {
        let mut entries = self.entries.write().await;
        let version = entries.get(key).map_or(1, |e| e.version + 1);
        entries.insert(key.to_string(), Entry { value, version });
    }

    /// Current key/value contents.
    pub async fn snapshot(&self) -> HashMap<String, Vec<u8>> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .map(|(k, e)| (k.clone(), e.value.clone()))
            .collect()
    }

    pub async fn events(&self) -> Vec<EmittedEvent> {
        self.events.read().await.clone()
    }

    /// Number of `put`/`put_if_version` calls that changed state.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StateAccessor for InMemoryStateStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).map(|e| e.value.clone()))
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let mut entries = self.entries.write().await;
        let version = entries.get(key).map_or(1, |e| e.version + 1);
        entries.insert(key.to_string(), Entry { value, version });
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn emit(&self, name: &str, payload: Vec<u8>) -> Result<()> {
        let mut events = self.events.write().await;
        events.push(EmittedEvent {
            name: name.to_string(),
            payload,
        });
        Ok(())
    }

    async fn get_versioned(&self, key: &str) -> Result<Option<Versioned>> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).map(|e| Versioned {
            value: e.value.clone(),
            version: e.version,
        }))
    }

    async fn put_if_version(&self, key: &str, value: Vec<u8>, expected: Option<u64>) -> Result<()> {
        // check and write under one lock
        let mut entries = self.entries.write().await;
        let actual = entries.get(key).map(|e| e.version);
        if actual != expected {
            return Err(LedgerError::VersionConflict {
                key: key.to_string(),
                expected,
                actual,
            });
        }
        let version = actual.map_or(1, |v| v + 1);
        entries.insert(key.to_string(), Entry { value, version });
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
