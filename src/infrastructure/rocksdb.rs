use crate::domain::ports::{StateAccessor, Versioned};
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

/// Column Family holding ledger values.
pub const CF_STATE: &str = "state";
/// Column Family holding the version stamp of each ledger key.
pub const CF_VERSIONS: &str = "versions";
/// Column Family holding emitted events, keyed by sequence number.
pub const CF_EVENTS: &str = "events";

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct StoredEvent {
    pub name: String,
    pub payload: Vec<u8>,
}

/// A persistent state store implementation using RocksDB.
///
/// A value and its version are written in one batch. Writers in this process are
/// serialized by a lock so versioned writes check and write atomically; other
/// processes sharing the database are not coordinated.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStateStore {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
    next_event: Arc<AtomicU64>,
}

impl RocksDBStateStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families exist and resumes event
    /// numbering after the last stored event.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cfs = [CF_STATE, CF_VERSIONS, CF_EVENTS]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()));
        let db = DB::open_cf_descriptors(&opts, path, cfs)?;

        let next_event = {
            let cf = db
                .cf_handle(CF_EVENTS)
                .ok_or_else(|| LedgerError::store("Events column family not found"))?;
            match db.iterator_cf(cf, IteratorMode::End).next() {
                Some(item) => {
                    let (key, _) = item?;
                    decode_u64(&key)? + 1
                }
                None => 0,
            }
        };

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
            next_event: Arc::new(AtomicU64::new(next_event)),
        })
    }

    /// All emitted events in emission order.
    pub fn events(&self) -> Result<Vec<StoredEvent>> {
        let cf = self.cf(CF_EVENTS)?;
        let mut events = Vec::new();
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            let (_key, value) = item?;
            let event = serde_json::from_slice(&value).map_err(|source| LedgerError::Decode {
                shape: "stored event",
                source,
            })?;
            events.push(event);
        }
        Ok(events)
    }

    fn cf(&self, name: &'static str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| LedgerError::store(format!("{name} column family not found")))
    }

    fn version(&self, key: &str) -> Result<Option<u64>> {
        let cf = self.cf(CF_VERSIONS)?;
        self.db
            .get_pinned_cf(&cf, key)?
            .map(|bytes| decode_u64(&bytes))
            .transpose()
    }

    fn write(&self, key: &str, value: Vec<u8>, current: Option<u64>) -> Result<()> {
        let state = self.cf(CF_STATE)?;
        let versions = self.cf(CF_VERSIONS)?;
        let next = current.map_or(1, |v| v + 1);

        let mut batch = WriteBatch::default();
        batch.put_cf(&state, key, value);
        batch.put_cf(&versions, key, next.to_be_bytes());
        self.db.write(batch)?;
        Ok(())
    }
}

fn decode_u64(bytes: &[u8]) -> Result<u64> {
    let raw: [u8; 8] = bytes
        .try_into()
        .map_err(|_| LedgerError::store("corrupt version or sequence number"))?;
    Ok(u64::from_be_bytes(raw))
}

#[async_trait]
impl StateAccessor for RocksDBStateStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let cf = self.cf(CF_STATE)?;
        Ok(self.db.get_cf(&cf, key)?)
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let current = self.version(key)?;
        self.write(key, value, current)
    }

    async fn emit(&self, name: &str, payload: Vec<u8>) -> Result<()> {
        let cf = self.cf(CF_EVENTS)?;
        let seq = self.next_event.fetch_add(1, Ordering::SeqCst);
        let event = StoredEvent {
            name: name.to_string(),
            payload,
        };
        let value = serde_json::to_vec(&event).map_err(|source| LedgerError::Encode {
            shape: "stored event",
            source,
        })?;
        self.db.put_cf(&cf, seq.to_be_bytes(), value)?;
        Ok(())
    }

    async fn get_versioned(&self, key: &str) -> Result<Option<Versioned>> {
        let _guard = self.write_lock.lock().await;
        let cf = self.cf(CF_STATE)?;
        let Some(value) = self.db.get_cf(&cf, key)? else {
            return Ok(None);
        };
        let version = self.version(key)?.unwrap_or(0);
        Ok(Some(Versioned { value, version }))
    }

    async fn put_if_version(&self, key: &str, value: Vec<u8>, expected: Option<u64>) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let actual = self.version(key)?;
        if actual != expected {
            return Err(LedgerError::VersionConflict {
                key: key.to_string(),
                expected,
                actual,
            });
        }
        self.write(key, value, actual)
    }
}
