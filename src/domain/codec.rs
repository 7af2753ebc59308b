//! JSON encoding of ledger records.
//!
//! Field names are stable and lowercase-first. Decoding ignores unknown fields
//! and fills missing ones with their zero value. Nothing else in the crate
//! serializes records.

use super::event::LedgerEvent;
use super::loan::LoanApplication;
use super::loan_index::LoanIndex;
use super::participant::Participant;
use crate::error::{LedgerError, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// A value that can be stored under a state key.
pub trait Record: Serialize + DeserializeOwned {
    /// Name used in error messages.
    const SHAPE: &'static str;
}

impl Record for LoanApplication {
    const SHAPE: &'static str = "loan application";
}

impl Record for LoanIndex {
    const SHAPE: &'static str = "loan index";
}

impl Record for Participant {
    const SHAPE: &'static str = "participant";
}

impl Record for Vec<Participant> {
    const SHAPE: &'static str = "participant list";
}

impl Record for LedgerEvent {
    const SHAPE: &'static str = "ledger event";
}

pub fn encode<R: Record>(record: &R) -> Result<Vec<u8>> {
    serde_json::to_vec(record).map_err(|source| LedgerError::Encode {
        shape: R::SHAPE,
        source,
    })
}

pub fn decode<R: Record>(bytes: &[u8]) -> Result<R> {
    serde_json::from_slice(bytes).map_err(|source| LedgerError::Decode {
        shape: R::SHAPE,
        source,
    })
}
