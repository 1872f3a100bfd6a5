// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! End-to-end transfers through the state machine using the fakes from
//! `cctp_orchestrator::testing`.

use alloy_chains::NamedChain;
use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;
use cctp_orchestrator::contracts::ITokenMessengerV2;
use cctp_orchestrator::testing::{
    AttestationOutcome, FakeAttestationProvider, FakeClock, FakeRpcTransport, FakeSigner,
    RecordingHistorySink,
};
use cctp_orchestrator::{
    CctpError, ChainRegistry, Clock, EndpointError, ErrorKind, ExecutorConfig, HistoryEntry,
    HistorySink, TokioClock, TransactionSigner, TransferRecord, TransferRequest, TransferState,
    TransferStateMachine, TransferType, HISTORY_NOTIFY_TIMEOUT_SECS,
};
use rstest::rstest;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const SEPOLIA: u64 = 11_155_111;
const BASE_SEPOLIA: u64 = 84_532;
const AMOUNT: u64 = 1_000_000;

fn recipient() -> Address {
    Address::with_last_byte(0x42)
}

fn signer() -> FakeSigner {
    FakeSigner::new(Address::with_last_byte(0x11))
}

fn request(transfer_type: TransferType) -> TransferRequest {
    TransferRequest::builder()
        .source_chain(NamedChain::Sepolia)
        .destination_chain(NamedChain::BaseSepolia)
        .amount(U256::from(AMOUNT))
        .recipient(recipient())
        .transfer_type(transfer_type)
        .build()
}

struct Harness<C> {
    machine: TransferStateMachine<FakeRpcTransport, FakeAttestationProvider, C>,
    transport: FakeRpcTransport,
    attestation: FakeAttestationProvider,
    history: RecordingHistorySink,
}

fn harness_with_clock<C: Clock + Clone>(outcomes: Vec<AttestationOutcome>, clock: C) -> Harness<C> {
    let transport = FakeRpcTransport::healthy();
    let attestation = FakeAttestationProvider::new(outcomes);
    let history = RecordingHistorySink::new();
    let machine = TransferStateMachine::new(
        ChainRegistry::testnet().unwrap(),
        transport.clone(),
        attestation.clone(),
        clock,
        ExecutorConfig::default(),
    )
    .unwrap()
    .with_history_sink(Arc::new(history.clone()));

    Harness {
        machine,
        transport,
        attestation,
        history,
    }
}

fn harness(outcomes: Vec<AttestationOutcome>) -> (Harness<FakeClock>, FakeClock) {
    let clock = FakeClock::new();
    (harness_with_clock(outcomes, clock.clone()), clock)
}

async fn run<C: Clock + Clone>(harness: &Harness<C>, signer: &FakeSigner) -> TransferRecord {
    harness
        .machine
        .execute(request(TransferType::Standard), signer, &CancellationToken::new())
        .await
        .unwrap()
}

fn visited_states(record: &TransferRecord) -> Vec<TransferState> {
    let mut states: Vec<TransferState> = Vec::new();
    for event in record.events() {
        if states.last() != Some(&event.state) {
            states.push(event.state);
        }
    }
    states
}

#[tokio::test]
async fn test_transfer_completes_end_to_end() {
    let (harness, _) = harness(vec![AttestationOutcome::complete()]);
    let signer = signer();

    let record = run(&harness, &signer).await;

    assert_eq!(record.state(), TransferState::Completed);
    assert!(record.failure().is_none());
    assert!(record.approval_tx_hash().is_some());
    assert!(record.source_tx_hash().is_some());
    assert!(record.destination_tx_hash().is_some());
    assert!(record.attestation().is_some());
    assert!(record.id().as_str().starts_with("sepolia-"));
    assert_eq!(
        visited_states(&record),
        vec![
            TransferState::Idle,
            TransferState::Approving,
            TransferState::Burning,
            TransferState::WaitingAttestation,
            TransferState::Minting,
            TransferState::Completed,
        ]
    );

    // approve + burn on the source chain, one mint on the destination
    assert_eq!(signer.sent_on(SEPOLIA).len(), 2);
    assert_eq!(signer.sent_on(BASE_SEPOLIA).len(), 1);

    // attestation looked up by source domain and burn hash
    assert_eq!(
        harness.attestation.calls()[0].1,
        record.source_tx_hash().unwrap()
    );

    let stored = harness.machine.transfers().get(record.id()).unwrap();
    assert_eq!(stored, record);

    let entries = harness.history.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].status, TransferState::Completed);
    assert_eq!(entries[0].transaction_hash, record.source_tx_hash());
    assert_eq!(entries[0].source_address, signer.address());
}

#[rstest]
#[case(TransferType::Fast, 1000)]
#[case(TransferType::Standard, 2000)]
#[tokio::test]
async fn test_burn_encodes_finality_threshold(
    #[case] transfer_type: TransferType,
    #[case] threshold: u32,
) {
    let (harness, _) = harness(vec![AttestationOutcome::complete()]);
    let signer = signer();

    let record = harness
        .machine
        .execute(request(transfer_type), &signer, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(record.state(), TransferState::Completed);

    let burn = signer
        .sent_on(SEPOLIA)
        .into_iter()
        .find(|sent| Some(sent.tx_hash) == record.source_tx_hash())
        .unwrap();
    let input = burn.tx.input.input().unwrap();
    let call = ITokenMessengerV2::depositForBurnCall::abi_decode(input).unwrap();

    assert_eq!(call.minFinalityThreshold, threshold);
    assert_eq!(call.destinationDomain, 6);
    assert_eq!(call.amount, U256::from(AMOUNT));
    assert_eq!(call.maxFee, U256::from(AMOUNT - 1));
    assert_eq!(call.mintRecipient, recipient().into_word());
    assert!(call.destinationCaller.is_zero());
}

#[tokio::test]
async fn test_existing_allowance_skips_approval() {
    let (harness, _) = harness(vec![AttestationOutcome::complete()]);
    harness.transport.set_allowance(U256::MAX);
    let signer = signer();

    let record = run(&harness, &signer).await;

    assert_eq!(record.state(), TransferState::Completed);
    assert!(record.approval_tx_hash().is_none());
    assert_eq!(signer.sent_on(SEPOLIA).len(), 1);
}

#[tokio::test]
async fn test_low_gas_balance_blocks_mint() {
    let (harness, _) = harness(vec![AttestationOutcome::complete()]);
    harness.transport.set_result("eth_getBalance", json!("0x0"));
    let signer = signer();

    let record = run(&harness, &signer).await;

    assert_eq!(record.state(), TransferState::Error);
    assert_eq!(
        record.failure().unwrap().kind,
        ErrorKind::InsufficientGasFunds
    );
    assert!(record.source_tx_hash().is_some());
    assert!(record.destination_tx_hash().is_none());
    assert!(signer.sent_on(BASE_SEPOLIA).is_empty());
    assert_eq!(harness.history.entries()[0].status, TransferState::Error);
}

#[tokio::test(start_paused = true)]
async fn test_attestation_polling_waits_between_attempts() {
    let harness = harness_with_clock(
        vec![
            AttestationOutcome::NotFound,
            AttestationOutcome::NotFound,
            AttestationOutcome::complete(),
        ],
        TokioClock,
    );
    let signer = signer();

    let start = tokio::time::Instant::now();
    let record = run(&harness, &signer).await;
    let elapsed = start.elapsed();

    assert_eq!(record.state(), TransferState::Completed);
    assert_eq!(harness.attestation.call_count(), 3);
    assert!(elapsed >= Duration::from_secs(10), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_secs(11), "elapsed {elapsed:?}");
}

#[tokio::test]
async fn test_mint_is_retried_with_linear_backoff() {
    let (harness, clock) = harness(vec![AttestationOutcome::complete()]);
    let signer = signer();
    signer.fail_sends_on(BASE_SEPOLIA, 2);

    let record = run(&harness, &signer).await;

    assert_eq!(record.state(), TransferState::Completed);
    assert_eq!(
        clock.sleeps(),
        vec![Duration::from_secs(2), Duration::from_secs(4)]
    );
    assert!(record
        .events()
        .iter()
        .any(|event| event.message.starts_with("Mint attempt 1 failed")));
    assert_eq!(signer.sent_on(BASE_SEPOLIA).len(), 1);
}

#[tokio::test]
async fn test_mint_gives_up_after_max_retries() {
    let (harness, clock) = harness(vec![AttestationOutcome::complete()]);
    let signer = signer();
    signer.fail_sends_on(BASE_SEPOLIA, usize::MAX);

    let record = run(&harness, &signer).await;

    assert_eq!(record.state(), TransferState::Error);
    let failure = record.failure().unwrap();
    assert_eq!(failure.kind, ErrorKind::TransactionFailed);
    assert!(failure.message.contains("receiveMessage"));
    // first attempt + 3 retries
    assert_eq!(signer.attempts(), 2 + 4);
    assert_eq!(
        clock.sleeps(),
        vec![
            Duration::from_secs(2),
            Duration::from_secs(4),
            Duration::from_secs(6)
        ]
    );
}

#[tokio::test]
async fn test_failed_attestation_ends_transfer() {
    let (harness, _) = harness(vec![AttestationOutcome::Pending, AttestationOutcome::Failed]);
    let signer = signer();

    let record = run(&harness, &signer).await;

    assert_eq!(record.state(), TransferState::Error);
    assert_eq!(record.failure().unwrap().kind, ErrorKind::AttestationFailed);
    assert!(signer.sent_on(BASE_SEPOLIA).is_empty());
}

#[tokio::test]
async fn test_reverted_burn_is_a_transaction_failure() {
    let (harness, _) = harness(vec![AttestationOutcome::complete()]);
    harness.transport.set_allowance(U256::MAX);
    harness.transport.set_result(
        "eth_getTransactionReceipt",
        json!({ "blockNumber": "0x10", "status": "0x0" }),
    );
    let signer = signer();

    let record = run(&harness, &signer).await;

    assert_eq!(record.state(), TransferState::Error);
    let failure = record.failure().unwrap();
    assert_eq!(failure.kind, ErrorKind::TransactionFailed);
    assert!(failure.message.contains("depositForBurn"));
    assert_eq!(harness.attestation.call_count(), 0);
}

#[tokio::test]
async fn test_rate_limited_endpoint_fails_over_mid_transfer() {
    let (harness, _) = harness(vec![AttestationOutcome::complete()]);
    let sepolia = ChainRegistry::testnet().unwrap();
    let primary = sepolia.resolve(NamedChain::Sepolia).unwrap().rpc_endpoints[0].clone();
    harness
        .transport
        .fail_endpoint(&primary, EndpointError::RateLimited);
    let signer = signer();

    let record = run(&harness, &signer).await;

    assert_eq!(record.state(), TransferState::Completed);
    // the dead endpoint is only tried once, then the cursor stays on the next one
    let hits = harness
        .transport
        .calls()
        .into_iter()
        .filter(|call| call.endpoint == primary)
        .count();
    assert_eq!(hits, 1);
}

#[tokio::test]
async fn test_invalid_requests_are_rejected_before_registration() {
    let (harness, _) = harness(vec![AttestationOutcome::complete()]);
    let signer = signer();
    let cancel = CancellationToken::new();

    let mut same_chain = request(TransferType::Fast);
    same_chain.destination_chain = NamedChain::Sepolia;
    let err = harness
        .machine
        .execute(same_chain, &signer, &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, CctpError::InvalidRequest { .. }));

    let mut fee_too_high = request(TransferType::Fast);
    fee_too_high.max_fee = Some(U256::from(AMOUNT));
    assert!(harness
        .machine
        .execute(fee_too_high, &signer, &cancel)
        .await
        .is_err());

    let mut unknown = request(TransferType::Fast);
    unknown.destination_chain = NamedChain::Base;
    let err = harness
        .machine
        .execute(unknown, &signer, &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, CctpError::UnknownChain { .. }));

    assert!(harness.machine.transfers().is_empty());
    assert!(signer.sent().is_empty());
}

#[tokio::test]
async fn test_history_sink_errors_do_not_change_outcome() {
    let transport = FakeRpcTransport::healthy();
    let history = RecordingHistorySink::rejecting();
    let machine = TransferStateMachine::new(
        ChainRegistry::testnet().unwrap(),
        transport,
        FakeAttestationProvider::completing(),
        FakeClock::new(),
        ExecutorConfig::default(),
    )
    .unwrap()
    .with_history_sink(Arc::new(history.clone()));

    let record = machine
        .execute(request(TransferType::Fast), &signer(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(record.state(), TransferState::Completed);
    assert_eq!(history.entries().len(), 1);
}

/// History endpoint that accepts the request and never answers.
struct StalledHistorySink;

#[async_trait::async_trait]
impl HistorySink for StalledHistorySink {
    async fn record(&self, _entry: &HistoryEntry) -> cctp_orchestrator::Result<()> {
        std::future::pending().await
    }
}

#[tokio::test(start_paused = true)]
async fn test_stalled_history_sink_is_given_up_on() {
    let (harness, _) = harness(vec![AttestationOutcome::complete()]);
    let machine = harness
        .machine
        .with_history_sink(Arc::new(StalledHistorySink));
    let started = tokio::time::Instant::now();

    let record = machine
        .execute(request(TransferType::Fast), &signer(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(record.state(), TransferState::Completed);
    assert_eq!(
        started.elapsed(),
        Duration::from_secs(HISTORY_NOTIFY_TIMEOUT_SECS)
    );
    assert_eq!(
        machine.transfers().get(record.id()).unwrap().state(),
        TransferState::Completed
    );
}

#[tokio::test(start_paused = true)]
async fn test_cancel_releases_stalled_history_sink() {
    let (harness, _) = harness(vec![AttestationOutcome::complete()]);
    let machine = harness
        .machine
        .with_history_sink(Arc::new(StalledHistorySink));
    let cancel = CancellationToken::new();
    let started = tokio::time::Instant::now();

    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        canceller.cancel();
    });

    let record = machine
        .execute(request(TransferType::Fast), &signer(), &cancel)
        .await
        .unwrap();

    assert_eq!(started.elapsed(), Duration::from_secs(1));
    assert_eq!(record.state(), TransferState::Completed);
}

#[tokio::test]
async fn test_cancelled_transfer_ends_in_error() {
    let (harness, _) = harness(vec![AttestationOutcome::Pending]);
    let history = harness.history.clone();
    let machine = Arc::new(harness.machine);
    let signer = Arc::new(signer());

    let handle = machine
        .start(request(TransferType::Standard), Arc::clone(&signer))
        .unwrap();
    let mut updates = machine.transfers().subscribe(handle.id()).unwrap();
    updates
        .wait_for(|record| record.state() == TransferState::WaitingAttestation)
        .await
        .unwrap();

    handle.cancel();
    let record = handle.wait().await.unwrap();

    assert_eq!(record.state(), TransferState::Error);
    assert_eq!(record.failure().unwrap().kind, ErrorKind::Cancelled);
    assert!(signer.sent_on(BASE_SEPOLIA).is_empty());
    assert_eq!(
        machine.transfers().get(record.id()).unwrap().state(),
        TransferState::Error
    );
    assert_eq!(history.entries().len(), 1);
}

#[tokio::test]
async fn test_concurrent_transfers_get_distinct_records() {
    let (harness, _) = harness(vec![AttestationOutcome::complete()]);
    let machine = Arc::new(harness.machine);
    let signer = Arc::new(signer());

    let first = machine
        .start(request(TransferType::Fast), Arc::clone(&signer))
        .unwrap();
    let second = machine
        .start(request(TransferType::Standard), Arc::clone(&signer))
        .unwrap();
    assert_ne!(first.id(), second.id());

    let (first, second) = tokio::join!(first.wait(), second.wait());
    assert_eq!(first.unwrap().state(), TransferState::Completed);
    assert_eq!(second.unwrap().state(), TransferState::Completed);

    let records = machine.transfers().list();
    assert_eq!(records.len(), 2);
    assert_eq!(machine.transfers().in_flight(), 0);
    assert_eq!(signer.sent_on(BASE_SEPOLIA).len(), 2);
}
