use super::loan_index::LoanIndexManager;
use super::loan_records::LoanRecordManager;
use super::participant_ledger::ParticipantLedgerManager;
use super::state::StateHandle;
use crate::config::LedgerConfig;
use crate::domain::codec;
use crate::domain::event::LedgerEvent;
use crate::domain::loan::LoanApplication;
use crate::domain::participant::Participant;
use crate::domain::ports::SharedStateAccessor;
use crate::domain::roster::Roster;
use crate::error::{LedgerError, Result};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Named entry points reachable through [`SyndicationOrchestrator::execute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateParticipants,
    CreateLoanParticipation,
    SettleLoanSyndication,
    GetLoanApplication,
    GetLoanParticipant,
    GetParticipatedLoans,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::CreateParticipants => "CreateParticipants",
            Operation::CreateLoanParticipation => "CreateLoanParticipation",
            Operation::SettleLoanSyndication => "SettleLoanSyndication",
            Operation::GetLoanApplication => "GetLoanApplication",
            Operation::GetLoanParticipant => "GetLoanParticipant",
            Operation::GetParticipatedLoans => "GetParticipatedLoans",
        }
    }

    pub fn is_query(&self) -> bool {
        matches!(
            self,
            Operation::GetLoanApplication
                | Operation::GetLoanParticipant
                | Operation::GetParticipatedLoans
        )
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "CreateParticipants" => Ok(Operation::CreateParticipants),
            "CreateLoanParticipation" => Ok(Operation::CreateLoanParticipation),
            "SettleLoanSyndication" => Ok(Operation::SettleLoanSyndication),
            "GetLoanApplication" => Ok(Operation::GetLoanApplication),
            "GetLoanParticipant" => Ok(Operation::GetLoanParticipant),
            "GetParticipatedLoans" => Ok(Operation::GetParticipatedLoans),
            other => Err(LedgerError::InvalidOperation(other.to_string())),
        }
    }
}

fn required<'a>(
    operation: Operation,
    args: &'a [String],
    position: usize,
    argument: &'static str,
) -> Result<&'a str> {
    match args.get(position) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(LedgerError::missing(operation.name(), argument)),
    }
}

fn require_roster(operation: Operation, roster: &Roster) -> Result<()> {
    if roster.is_empty() {
        return Err(LedgerError::InvalidConfig(format!(
            "{operation} requires a non-empty participant roster"
        )));
    }
    Ok(())
}

/// Sequences the managers for each ledger operation.
///
/// Every invocation reads current state, computes, and writes back, one key at a
/// time. Nothing is held between invocations. Writes are not atomic across keys:
/// when a step fails, writes from earlier steps stay in place and a retry applies
/// on top of them. Callers that may run invocations touching the same keys
/// concurrently must serialize them, or accept lost updates on the loan index
/// and participant records (optimistic mode turns those into `VersionConflict`
/// failures instead).
pub struct SyndicationOrchestrator {
    config: LedgerConfig,
    state: StateHandle,
    loans: LoanRecordManager,
    index: LoanIndexManager,
    ledger: ParticipantLedgerManager,
}

impl SyndicationOrchestrator {
    pub fn new(accessor: SharedStateAccessor, config: LedgerConfig) -> Self {
        let state = StateHandle::new(accessor, config.consistency);
        Self {
            loans: LoanRecordManager::new(state.clone()),
            index: LoanIndexManager::new(state.clone(), config.index_key.clone()),
            ledger: ParticipantLedgerManager::new(state.clone(), config.fee_accrual()),
            state,
            config,
        }
    }

    /// Loan records share the key space with participants and the index.
    fn check_loan_key(&self, roster: &Roster, loan_id: &str) -> Result<()> {
        if loan_id == self.config.index_key || roster.get(loan_id).is_some() {
            return Err(LedgerError::ReservedKey {
                key: loan_id.to_string(),
            });
        }
        Ok(())
    }

    /// Ledger initialization: seeds the participants named in `args`.
    pub async fn init(&self, args: &[String]) -> Result<Vec<u8>> {
        self.create_participants(&self.config.roster, args).await
    }

    /// Dispatches a mutating operation by name.
    pub async fn invoke(&self, function: &str, args: &[String]) -> Result<Vec<u8>> {
        let operation: Operation = function.parse()?;
        if operation.is_query() {
            return Err(LedgerError::InvalidOperation(function.to_string()));
        }
        self.execute(operation, args).await
    }

    /// Dispatches a read-only operation by name.
    pub async fn query(&self, function: &str, args: &[String]) -> Result<Vec<u8>> {
        let operation: Operation = function.parse()?;
        if !operation.is_query() {
            return Err(LedgerError::InvalidOperation(function.to_string()));
        }
        self.execute(operation, args).await
    }

    /// Runs `operation` against the configured roster.
    pub async fn execute(&self, operation: Operation, args: &[String]) -> Result<Vec<u8>> {
        let roster = &self.config.roster;
        match operation {
            Operation::CreateParticipants => self.create_participants(roster, args).await,
            Operation::CreateLoanParticipation => {
                let loan_id = required(operation, args, 0, "loan application id")?;
                let payload = required(operation, args, 1, "loan application payload")?;
                self.create_loan_participation(roster, loan_id, payload.as_bytes())
                    .await
            }
            Operation::SettleLoanSyndication => {
                let loan_id = required(operation, args, 0, "loan application id")?;
                let amount = required(operation, args, 1, "settlement amount")?;
                self.settle_loan_syndication(roster, loan_id, amount).await
            }
            Operation::GetLoanApplication => self.get_loan_application(args).await,
            Operation::GetLoanParticipant => self.get_loan_participant(args).await,
            Operation::GetParticipatedLoans => self.get_participated_loans().await,
        }
    }

    /// Writes a fresh record for each roster participant named in `ids`.
    ///
    /// All ids are resolved before anything is written. A failure part way
    /// through leaves the earlier participants written.
    pub async fn create_participants(&self, roster: &Roster, ids: &[String]) -> Result<Vec<u8>> {
        let operation = Operation::CreateParticipants;
        debug!(?ids, "Entering {operation}");
        required(operation, ids, 0, "participant id")?;
        require_roster(operation, roster)?;

        let entries = ids
            .iter()
            .map(|id| roster.get(id).ok_or_else(|| LedgerError::not_found(id.as_str())))
            .collect::<Result<Vec<_>>>()?;

        let mut created: Vec<Participant> = Vec::with_capacity(entries.len());
        for entry in entries {
            let participant = entry.to_participant();
            self.ledger.store(&participant).await.inspect_err(|e| {
                if !created.is_empty() {
                    warn!(error = %e, written = created.len(), "participant seeding partially applied");
                }
            })?;
            created.push(participant);
        }

        info!(count = created.len(), "created participants");
        codec::encode(&created)
    }

    /// Records a new loan, indexes it, and allocates a pro-rata position to every
    /// roster participant. Returns the encoded loan index.
    pub async fn create_loan_participation(
        &self,
        roster: &Roster,
        loan_id: &str,
        payload: &[u8],
    ) -> Result<Vec<u8>> {
        let operation = Operation::CreateLoanParticipation;
        debug!(loan_id, "Entering {operation}");
        if loan_id.is_empty() {
            return Err(LedgerError::missing(operation.name(), "loan application id"));
        }
        require_roster(operation, roster)?;
        self.check_loan_key(roster, loan_id)?;

        self.loans.create_or_replace(loan_id, payload).await?;

        let partial = |step: &'static str| {
            move |e: &LedgerError| warn!(loan_id, step, error = %e, "loan participation partially applied")
        };

        let loan: LoanApplication = codec::decode(payload).inspect_err(partial("decode"))?;
        let deal_amount = loan.deal_amount;

        let index_bytes = self
            .index
            .append(loan)
            .await
            .inspect_err(partial("index"))?;

        for entry in roster.entries() {
            self.ledger
                .add_position(&entry.id, loan_id, deal_amount)
                .await
                .inspect_err(partial("allocate"))?;
        }

        self.emit(&LedgerEvent::created(loan_id))
            .await
            .inspect_err(partial("emit"))?;

        info!(loan_id, deal_amount, "Successfully saved loan application");
        Ok(index_bytes)
    }

    /// Applies a settlement to the loan and to every roster participant's matching
    /// positions. Returns the encoded updated loan.
    pub async fn settle_loan_syndication(
        &self,
        roster: &Roster,
        loan_id: &str,
        amount_text: &str,
    ) -> Result<Vec<u8>> {
        let operation = Operation::SettleLoanSyndication;
        debug!(loan_id, amount = amount_text, "Entering {operation}");
        if loan_id.is_empty() {
            return Err(LedgerError::missing(operation.name(), "loan application id"));
        }

        let amount: i64 = amount_text.parse().map_err(|source| LedgerError::Parse {
            value: amount_text.to_string(),
            source,
        })?;
        require_roster(operation, roster)?;
        self.check_loan_key(roster, loan_id)?;

        let loan = self.loans.apply_settlement(loan_id, amount).await?;

        let partial = |step: &'static str| {
            move |e: &LedgerError| warn!(loan_id, step, error = %e, "loan settlement partially applied")
        };

        for entry in roster.entries() {
            self.ledger
                .apply_settlement(&entry.id, loan_id, loan.all_in_rate, amount)
                .await
                .inspect_err(partial("participant"))?;
        }

        self.emit(&LedgerEvent::settled(loan_id, amount))
            .await
            .inspect_err(partial("emit"))?;

        info!(
            loan_id,
            amount,
            outstanding = loan.outstanding_settlement_amount,
            "Successfully settled loan"
        );
        codec::encode(&loan)
    }

    pub async fn get_loan_application(&self, args: &[String]) -> Result<Vec<u8>> {
        let operation = Operation::GetLoanApplication;
        debug!("Entering {operation}");
        let loan_id = required(operation, args, 0, "loan application id")?;
        self.loans.fetch(loan_id).await
    }

    pub async fn get_loan_participant(&self, args: &[String]) -> Result<Vec<u8>> {
        let operation = Operation::GetLoanParticipant;
        debug!("Entering {operation}");
        let participant_id = required(operation, args, 0, "participant id")?;
        self.ledger.fetch_raw(participant_id).await
    }

    pub async fn get_participated_loans(&self) -> Result<Vec<u8>> {
        debug!("Entering {}", Operation::GetParticipatedLoans);
        self.index.fetch_raw().await
    }

    async fn emit(&self, event: &LedgerEvent) -> Result<()> {
        self.state
            .emit(&self.config.event_name, codec::encode(event)?)
            .await
    }
}
