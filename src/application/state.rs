use crate::config::ConsistencyMode;
use crate::domain::ports::SharedStateAccessor;
use crate::error::Result;

/// What a key held when it was read, and the version stamp to write against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub value: Option<Vec<u8>>,
    version: Option<u64>,
}

impl Slot {
    /// Stored bytes, treating an empty value the same as an absent one.
    pub fn bytes(&self) -> Option<&[u8]> {
        self.value.as_deref().filter(|b| !b.is_empty())
    }
}

/// Shared access to the state store for the managers of one orchestrator.
///
/// All read-modify-write cycles go through [`StateHandle::read`] and
/// [`StateHandle::write_back`] so the configured [`ConsistencyMode`] is applied
/// in one place.
#[derive(Clone)]
pub struct StateHandle {
    accessor: SharedStateAccessor,
    mode: ConsistencyMode,
}

impl StateHandle {
    pub fn new(accessor: SharedStateAccessor, mode: ConsistencyMode) -> Self {
        Self { accessor, mode }
    }

    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.accessor.get(key).await
    }

    /// Unconditional write.
    pub async fn put(&self, key: &str, value: Vec<u8>) -> Result<()> {
        self.accessor.put(key, value).await
    }

    pub async fn emit(&self, name: &str, payload: Vec<u8>) -> Result<()> {
        self.accessor.emit(name, payload).await
    }

    pub async fn read(&self, key: &str) -> Result<Slot> {
        match self.mode {
            ConsistencyMode::LastWriteWins => Ok(Slot {
                value: self.accessor.get(key).await?,
                version: None,
            }),
            ConsistencyMode::Optimistic => {
                let versioned = self.accessor.get_versioned(key).await?;
                Ok(match versioned {
                    Some(v) => Slot {
                        value: Some(v.value),
                        version: Some(v.version),
                    },
                    None => Slot {
                        value: None,
                        version: None,
                    },
                })
            }
        }
    }

    /// Writes `value` over the key `slot` was read from.
    pub async fn write_back(&self, key: &str, value: Vec<u8>, slot: &Slot) -> Result<()> {
        match self.mode {
            ConsistencyMode::LastWriteWins => self.accessor.put(key, value).await,
            ConsistencyMode::Optimistic => {
                self.accessor
                    .put_if_version(key, value, slot.version)
                    .await
            }
        }
    }
}
