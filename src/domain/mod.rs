//! Ledger records, their encoding, and the storage port they are kept behind.

pub mod codec;
pub mod event;
pub mod loan;
pub mod loan_index;
pub mod participant;
pub mod ports;
pub mod roster;
