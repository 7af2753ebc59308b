use super::state::StateHandle;
use crate::domain::codec;
use crate::domain::loan::LoanApplication;
use crate::domain::loan_index::LoanIndex;
use crate::error::Result;
use tracing::debug;

/// Maintains the single loan index record stored under a sentinel key.
///
/// `append` is a read-modify-write of one key. Two appends that read the same
/// prior index will both write, and the later one drops the earlier entry
/// unless the store runs in optimistic mode.
#[derive(Clone)]
pub struct LoanIndexManager {
    state: StateHandle,
    key: String,
}

impl LoanIndexManager {
    pub fn new(state: StateHandle, key: impl Into<String>) -> Self {
        Self {
            state,
            key: key.into(),
        }
    }

    /// Appends `loan` to the end of the index and returns the encoded index written.
    pub async fn append(&self, loan: LoanApplication) -> Result<Vec<u8>> {
        let slot = self.state.read(&self.key).await?;
        let mut index: LoanIndex = match slot.bytes() {
            Some(bytes) => codec::decode(bytes)?,
            None => LoanIndex::new(),
        };

        index.append(loan);
        debug!(key = %self.key, len = index.len(), "appended loan to index");

        let bytes = codec::encode(&index)?;
        self.state.write_back(&self.key, bytes.clone(), &slot).await?;
        Ok(bytes)
    }

    pub async fn fetch_all(&self) -> Result<LoanIndex> {
        match self.state.get(&self.key).await? {
            Some(bytes) if !bytes.is_empty() => codec::decode(&bytes),
            _ => Ok(LoanIndex::new()),
        }
    }

    /// The stored index bytes, or the encoding of an empty index if none exist yet.
    pub async fn fetch_raw(&self) -> Result<Vec<u8>> {
        match self.state.get(&self.key).await? {
            Some(bytes) if !bytes.is_empty() => Ok(bytes),
            _ => codec::encode(&LoanIndex::new()),
        }
    }
}
