use super::state::StateHandle;
use crate::domain::codec;
use crate::domain::loan::LoanApplication;
use crate::error::{LedgerError, Result};
use tracing::debug;

/// Reads and writes individual loan records, keyed by loan id.
#[derive(Clone)]
pub struct LoanRecordManager {
    state: StateHandle,
}

impl LoanRecordManager {
    pub fn new(state: StateHandle) -> Self {
        Self { state }
    }

    /// Stores `raw` verbatim under `id`. The payload's shape is not checked.
    pub async fn create_or_replace(&self, id: &str, raw: &[u8]) -> Result<()> {
        debug!(loan_id = id, bytes = raw.len(), "storing loan record");
        self.state.put(id, raw.to_vec()).await
    }

    /// Returns the stored bytes. Empty or absent values are `NotFound`.
    pub async fn fetch(&self, id: &str) -> Result<Vec<u8>> {
        if id.is_empty() {
            return Err(LedgerError::not_found(id));
        }
        match self.state.get(id).await? {
            Some(bytes) if !bytes.is_empty() => Ok(bytes),
            _ => Err(LedgerError::not_found(id)),
        }
    }

    pub async fn fetch_record(&self, id: &str) -> Result<LoanApplication> {
        codec::decode(&self.fetch(id).await?)
    }

    /// Subtracts `amount` from the loan's outstanding balance and writes it back.
    pub async fn apply_settlement(&self, id: &str, amount: i64) -> Result<LoanApplication> {
        if id.is_empty() {
            return Err(LedgerError::not_found(id));
        }
        let slot = self.state.read(id).await?;
        let bytes = slot.bytes().ok_or_else(|| LedgerError::not_found(id))?;
        let mut loan: LoanApplication = codec::decode(bytes)?;

        loan.settle(amount)?;
        debug!(
            loan_id = id,
            amount,
            outstanding = loan.outstanding_settlement_amount,
            "applied settlement to loan"
        );

        self.state.write_back(id, codec::encode(&loan)?, &slot).await?;
        Ok(loan)
    }
}
