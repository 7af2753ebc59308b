use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// A stored value together with the version stamp it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned {
    pub value: Vec<u8>,
    pub version: u64,
}

/// Point reads and writes against the hosting key-value store, plus its event channel.
///
/// A `put` is visible to a later `get` issued by the same caller. Nothing else is
/// promised: there is no multi-key atomicity and no isolation between callers.
#[async_trait]
pub trait StateAccessor: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()>;
    async fn emit(&self, name: &str, payload: Vec<u8>) -> Result<()>;

    /// Reads a value with its version stamp.
    ///
    /// Stores without versioning report every present value at version 0.
    async fn get_versioned(&self, key: &str) -> Result<Option<Versioned>> {
        Ok(self
            .get(key)
            .await?
            .map(|value| Versioned { value, version: 0 }))
    }

    /// Writes only if the key is still at `expected` (`None` meaning absent).
    ///
    /// Stores without versioning cannot honour this and fail.
    async fn put_if_version(&self, key: &str, _value: Vec<u8>, _expected: Option<u64>) -> Result<()> {
        Err(LedgerError::store(format!(
            "versioned write to {key:?} not supported by this store"
        )))
    }
}

pub type StateAccessorBox = Box<dyn StateAccessor>;
pub type SharedStateAccessor = Arc<dyn StateAccessor>;
pub type StateAccessorFactory = Box<dyn Fn() -> StateAccessorBox + Send + Sync>;
