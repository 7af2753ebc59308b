use super::state::{Slot, StateHandle};
use crate::domain::codec;
use crate::domain::participant::{Asset, FeeAccrual, Participant};
use crate::error::{LedgerError, Result};
use tracing::debug;

/// Reads and writes participant records, each owning its list of positions.
#[derive(Clone)]
pub struct ParticipantLedgerManager {
    state: StateHandle,
    accrual: FeeAccrual,
}

impl ParticipantLedgerManager {
    pub fn new(state: StateHandle, accrual: FeeAccrual) -> Self {
        Self { state, accrual }
    }

    /// Returns the stored participant bytes unchanged.
    pub async fn fetch_raw(&self, id: &str) -> Result<Vec<u8>> {
        if id.is_empty() {
            return Err(LedgerError::not_found(id));
        }
        match self.state.get(id).await? {
            Some(bytes) if !bytes.is_empty() => Ok(bytes),
            _ => Err(LedgerError::not_found(id)),
        }
    }

    pub async fn fetch(&self, id: &str) -> Result<Participant> {
        codec::decode(&self.fetch_raw(id).await?)
    }

    /// Overwrites the participant record and returns the bytes written.
    pub async fn store(&self, participant: &Participant) -> Result<Vec<u8>> {
        let bytes = codec::encode(participant)?;
        self.state.put(&participant.id, bytes.clone()).await?;
        Ok(bytes)
    }

    /// Appends a pro-rata position on `loan_id` to the participant's asset list.
    ///
    /// Callers must add at most one position per (participant, loan); a second call
    /// appends a second position.
    pub async fn add_position(
        &self,
        participant_id: &str,
        loan_id: &str,
        principal_amount: i64,
    ) -> Result<Asset> {
        let (slot, mut participant) = self.load(participant_id).await?;

        let asset = participant.add_position(loan_id, principal_amount)?;
        debug!(
            participant_id,
            loan_id,
            share_amount = asset.share_amount,
            positions = participant.asset_list.len(),
            "added position"
        );

        self.state
            .write_back(participant_id, codec::encode(&participant)?, &slot)
            .await?;
        Ok(asset)
    }

    /// Settles every position the participant holds on `loan_id`.
    ///
    /// The record is written back even when no position matched. Returns the
    /// number of positions changed.
    pub async fn apply_settlement(
        &self,
        participant_id: &str,
        loan_id: &str,
        annual_rate_percent: i64,
        settlement_amount: i64,
    ) -> Result<usize> {
        let (slot, mut participant) = self.load(participant_id).await?;

        let matched = participant.apply_settlement(
            loan_id,
            annual_rate_percent,
            settlement_amount,
            self.accrual,
        )?;
        debug!(participant_id, loan_id, matched, "settled positions");

        self.state
            .write_back(participant_id, codec::encode(&participant)?, &slot)
            .await?;
        Ok(matched)
    }

    async fn load(&self, id: &str) -> Result<(Slot, Participant)> {
        if id.is_empty() {
            return Err(LedgerError::not_found(id));
        }
        let slot = self.state.read(id).await?;
        let participant = match slot.bytes() {
            Some(bytes) => codec::decode(bytes)?,
            None => return Err(LedgerError::not_found(id)),
        };
        Ok((slot, participant))
    }
}
