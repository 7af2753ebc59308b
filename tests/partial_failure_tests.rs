use std::sync::Arc;
use syndication_ledger::application::orchestrator::SyndicationOrchestrator;
use syndication_ledger::config::ConsistencyMode;
use syndication_ledger::domain::codec;
use syndication_ledger::domain::loan_index::LoanIndex;
use syndication_ledger::domain::participant::Participant;
use syndication_ledger::error::LedgerError;
use syndication_ledger::infrastructure::in_memory::InMemoryStateStore;

mod common;
use common::{FailingStore, INDEX_KEY, args, loan_payload};

fn failing_syndicate() -> (FailingStore, SyndicationOrchestrator) {
    let store = FailingStore::new(InMemoryStateStore::new());
    let orchestrator = SyndicationOrchestrator::new(
        Arc::new(store.clone()),
        common::config(&[("P1", 80), ("P2", 20)], ConsistencyMode::LastWriteWins),
    );
    (store, orchestrator)
}

async fn index_len(store: &FailingStore) -> usize {
    let bytes = store.inner.snapshot().await.remove(INDEX_KEY).unwrap_or_default();
    if bytes.is_empty() {
        return 0;
    }
    codec::decode::<LoanIndex>(&bytes).unwrap().len()
}

#[tokio::test]
async fn test_failed_participant_write_leaves_earlier_writes() {
    let (store, orchestrator) = failing_syndicate();
    orchestrator.init(&args(&["P1", "P2"])).await.unwrap();

    store.fail_writes_to(Some("P2"));
    let result = orchestrator
        .invoke(
            "CreateLoanParticipation",
            &args(&["la1", &loan_payload("la1", 1000, 10)]),
        )
        .await;
    assert!(matches!(result, Err(LedgerError::StoreFailure(_))));

    let snapshot = store.inner.snapshot().await;
    assert!(snapshot.contains_key("la1"));
    assert_eq!(index_len(&store).await, 1);

    let p1: Participant = codec::decode(&snapshot["P1"]).unwrap();
    let p2: Participant = codec::decode(&snapshot["P2"]).unwrap();
    assert_eq!(p1.asset_list.len(), 1);
    assert!(p2.asset_list.is_empty());
    assert!(store.inner.events().await.is_empty());
}

#[tokio::test]
async fn test_retry_after_partial_failure_mutates_further() {
    let (store, orchestrator) = failing_syndicate();
    orchestrator.init(&args(&["P1", "P2"])).await.unwrap();
    let call = args(&["la1", &loan_payload("la1", 1000, 10)]);

    store.fail_writes_to(Some("P2"));
    assert!(orchestrator.invoke("CreateLoanParticipation", &call).await.is_err());

    store.fail_writes_to(None);
    orchestrator
        .invoke("CreateLoanParticipation", &call)
        .await
        .unwrap();

    let snapshot = store.inner.snapshot().await;
    let p1: Participant = codec::decode(&snapshot["P1"]).unwrap();
    let p2: Participant = codec::decode(&snapshot["P2"]).unwrap();
    assert_eq!(index_len(&store).await, 2);
    assert_eq!(p1.positions("la1").count(), 2);
    assert_eq!(p2.positions("la1").count(), 1);
}

#[tokio::test]
async fn test_undecodable_payload_is_stored_but_not_indexed() {
    let (store, orchestrator) = failing_syndicate();
    orchestrator.init(&args(&["P1", "P2"])).await.unwrap();

    let result = orchestrator
        .invoke("CreateLoanParticipation", &args(&["la1", "{not json"]))
        .await;
    assert!(matches!(result, Err(LedgerError::Decode { .. })));

    let stored = orchestrator
        .query("GetLoanApplication", &args(&["la1"]))
        .await
        .unwrap();
    assert_eq!(stored, b"{not json".to_vec());
    assert_eq!(index_len(&store).await, 0);
}

#[tokio::test]
async fn test_emit_failure_after_all_writes() {
    let (store, orchestrator) = failing_syndicate();
    orchestrator.init(&args(&["P1", "P2"])).await.unwrap();
    store.fail_emits(true);

    let result = orchestrator
        .invoke(
            "CreateLoanParticipation",
            &args(&["la1", &loan_payload("la1", 1000, 10)]),
        )
        .await;
    assert!(matches!(result, Err(LedgerError::StoreFailure(_))));

    let snapshot = store.inner.snapshot().await;
    let p2: Participant = codec::decode(&snapshot["P2"]).unwrap();
    assert_eq!(p2.asset_list[0].share_amount, 200);
}

#[tokio::test]
async fn test_settlement_fails_on_unseeded_participant_after_loan_write() {
    let (store, orchestrator) = failing_syndicate();
    // only P1 exists in the store
    orchestrator.init(&args(&["P1"])).await.unwrap();
    store
        .inner
        .insert_raw("la1", loan_payload("la1", 1000, 10).into_bytes())
        .await;

    let result = orchestrator
        .invoke("SettleLoanSyndication", &args(&["la1", "100"]))
        .await;
    assert!(matches!(result, Err(LedgerError::NotFound { .. })));

    let loan = orchestrator
        .query("GetLoanApplication", &args(&["la1"]))
        .await
        .unwrap();
    let loan: syndication_ledger::domain::loan::LoanApplication = codec::decode(&loan).unwrap();
    assert_eq!(loan.outstanding_settlement_amount, 900);
}
