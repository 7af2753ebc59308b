#![allow(dead_code)]

use async_trait::async_trait;
use std::fs::File;
use std::io::{Error, Write};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use syndication_ledger::application::orchestrator::SyndicationOrchestrator;
use syndication_ledger::config::{ConsistencyMode, LedgerConfig};
use syndication_ledger::domain::participant::SharePercent;
use syndication_ledger::domain::ports::{StateAccessor, Versioned};
use syndication_ledger::domain::roster::{Roster, RosterEntry};
use syndication_ledger::error::{LedgerError, Result};
use syndication_ledger::infrastructure::in_memory::InMemoryStateStore;

pub const INDEX_KEY: &str = "loanlist";

pub fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

pub fn loan_payload(id: &str, deal_amount: i64, all_in_rate: i64) -> String {
    serde_json::json!({
        "id": id,
        "propertyId": "prop1",
        "landId": "land1",
        "permitId": "permit1",
        "buyerId": "vojha24",
        "personalInfo": {
            "firstname": "Varun",
            "lastname": "Ojha",
            "DOB": "dob",
            "email": "varun@gmail.com",
            "mobile": "99999999"
        },
        "financialInfo": {
            "monthlySalary": 16000,
            "otherExpenditure": 0,
            "monthlyRent": 4150,
            "monthlyLoanPayment": 4000
        },
        "status": "Submitted",
        "requestedAmount": deal_amount,
        "fairMarketValue": 58000,
        "approvedAmount": deal_amount,
        "dealAmount": deal_amount,
        "outstandingSettlementAmount": deal_amount,
        "allInRate": all_in_rate,
        "reviewerId": "bond",
        "lastModifiedDate": "21/09/2016 2:30pm"
    })
    .to_string()
}

pub fn roster(entries: &[(&str, i64)]) -> Roster {
    Roster::new(
        entries
            .iter()
            .map(|(id, percent)| {
                RosterEntry::new(*id, format!("{id} Bank"), SharePercent::new(*percent).unwrap())
            })
            .collect(),
    )
    .unwrap()
}

pub fn config(entries: &[(&str, i64)], consistency: ConsistencyMode) -> LedgerConfig {
    LedgerConfig {
        consistency,
        ..LedgerConfig::with_roster(roster(entries))
    }
}

/// An orchestrator over a fresh in-memory store with participants P1 (80) and P2 (20).
pub fn syndicate() -> (InMemoryStateStore, SyndicationOrchestrator) {
    let store = InMemoryStateStore::new();
    let orchestrator = SyndicationOrchestrator::new(
        Arc::new(store.clone()),
        config(&[("P1", 80), ("P2", 20)], ConsistencyMode::LastWriteWins),
    );
    (store, orchestrator)
}

/// Delegates to an in-memory store but fails writes to one key.
#[derive(Clone)]
pub struct FailingStore {
    pub inner: InMemoryStateStore,
    fail_key: Arc<std::sync::Mutex<Option<String>>>,
    fail_emit: Arc<AtomicBool>,
}

impl FailingStore {
    pub fn new(inner: InMemoryStateStore) -> Self {
        Self {
            inner,
            fail_key: Arc::new(std::sync::Mutex::new(None)),
            fail_emit: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn fail_writes_to(&self, key: Option<&str>) {
        *self.fail_key.lock().unwrap() = key.map(str::to_string);
    }

    pub fn fail_emits(&self, fail: bool) {
        self.fail_emit.store(fail, Ordering::SeqCst);
    }

    fn check(&self, key: &str) -> Result<()> {
        if self.fail_key.lock().unwrap().as_deref() == Some(key) {
            return Err(LedgerError::store(format!("injected failure writing {key}")));
        }
        Ok(())
    }
}

#[async_trait]
impl StateAccessor for FailingStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()> {
        self.check(key)?;
        self.inner.put(key, value).await
    }

    async fn emit(&self, name: &str, payload: Vec<u8>) -> Result<()> {
        if self.fail_emit.load(Ordering::SeqCst) {
            return Err(LedgerError::store("injected emit failure"));
        }
        self.inner.emit(name, payload).await
    }
}

/// Simulates another invocation writing `key` between our read and our write.
///
/// The first read of `key` returns what was stored, after which `interloper` is
/// written to it behind the reader's back.
#[derive(Clone)]
pub struct InterleavingStore {
    pub inner: InMemoryStateStore,
    key: String,
    interloper: Vec<u8>,
    fired: Arc<AtomicBool>,
}

impl InterleavingStore {
    pub fn new(inner: InMemoryStateStore, key: &str, interloper: Vec<u8>) -> Self {
        Self {
            inner,
            key: key.to_string(),
            interloper,
            fired: Arc::new(AtomicBool::new(false)),
        }
    }

    async fn interleave(&self, key: &str) -> Result<()> {
        if key == self.key && !self.fired.swap(true, Ordering::SeqCst) {
            self.inner.put(key, self.interloper.clone()).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl StateAccessor for InterleavingStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let value = self.inner.get(key).await?;
        self.interleave(key).await?;
        Ok(value)
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()> {
        self.inner.put(key, value).await
    }

    async fn emit(&self, name: &str, payload: Vec<u8>) -> Result<()> {
        self.inner.emit(name, payload).await
    }

    async fn get_versioned(&self, key: &str) -> Result<Option<Versioned>> {
        let value = self.inner.get_versioned(key).await?;
        self.interleave(key).await?;
        Ok(value)
    }

    async fn put_if_version(&self, key: &str, value: Vec<u8>, expected: Option<u64>) -> Result<()> {
        self.inner.put_if_version(key, value, expected).await
    }
}

pub fn write_config(path: &Path, entries: &[(&str, i64)]) -> std::result::Result<(), Error> {
    let roster: Vec<_> = entries
        .iter()
        .map(|(id, percent)| serde_json::json!({"id": id, "name": format!("{id} Bank"), "sharePercent": percent}))
        .collect();
    let mut file = File::create(path)?;
    write!(file, "{}", serde_json::json!({ "roster": roster }))?;
    Ok(())
}

/// Writes a batch that seeds P1/P2, then creates and settles `loans` loans.
pub fn generate_invocations_csv(path: &Path, loans: usize) -> std::result::Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(file);

    wtr.write_record(["operation", "args"])?;
    wtr.write_record(["Init", "P1", "P2"])?;

    for i in 1..=loans {
        let id = format!("la{i}");
        wtr.write_record([
            "CreateLoanParticipation",
            id.as_str(),
            loan_payload(&id, 1000 * i as i64, 10).as_str(),
        ])?;
        wtr.write_record(["SettleLoanSyndication", id.as_str(), "100"])?;
    }

    wtr.flush()?;
    Ok(())
}
