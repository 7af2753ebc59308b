//! Application layer containing the ledger's business logic orchestration.
//!
//! [`orchestrator::SyndicationOrchestrator`] is the entry point. It sequences the
//! loan record, loan index and participant ledger managers, each of which reads
//! current state from the store, computes, and writes back.

pub mod loan_index;
pub mod loan_records;
pub mod orchestrator;
pub mod participant_ledger;
pub mod state;
