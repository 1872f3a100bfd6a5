// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Test utilities and fake implementations of the orchestrator's seams
//!
//! These fakes make it possible to run whole transfers, including adversarial
//! scenarios, without a node, a wallet or Circle's API:
//!
//! - [`FakeRpcTransport`]: scripted JSON-RPC answers per method, per-endpoint
//!   failures and a log of every request
//! - [`FakeSigner`]: records sent transactions and can be told to fail
//! - [`FakeAttestationProvider`]: plays back a sequence of attestation outcomes
//! - [`FakeClock`]: virtual time that advances only when slept on
//! - [`RecordingHistorySink`]: keeps every reported outcome

use alloy_primitives::{hex, Address, Bytes, TxHash, B256, U256};
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

use crate::bridge::HistoryEntry;
use crate::contracts::IErc20;
use crate::error::{CctpError, EndpointError, Result};
use crate::protocol::{AttestationStatus, DomainId, V2AttestationResponse, V2Message};
use crate::traits::{AttestationProvider, Clock, HistorySink, RpcTransport, TransactionSigner};

/// Default USDC balance reported by [`FakeRpcTransport::healthy`]: 1 000 USDC.
pub const FAKE_USDC_BALANCE: u64 = 1_000_000_000;

// ============================================================================
// Fake RPC Transport
// ============================================================================

/// One request seen by [`FakeRpcTransport`].
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedCall {
    pub endpoint: Url,
    pub method: String,
    pub params: Value,
}

#[derive(Debug, Default)]
struct RpcState {
    results: HashMap<String, Value>,
    queued: HashMap<String, VecDeque<Value>>,
    call_results: HashMap<[u8; 4], Value>,
    endpoint_failures: HashMap<Url, EndpointError>,
    method_failures: HashMap<String, EndpointError>,
    calls: Vec<RecordedCall>,
}

/// A scripted JSON-RPC node shared by every endpoint.
///
/// Answers come from, in order: an endpoint failure, a method failure, the
/// queue for the method, the fixed result for the method. `eth_call` is
/// answered by function selector instead of by method.
#[derive(Clone, Debug, Default)]
pub struct FakeRpcTransport {
    state: Arc<Mutex<RpcState>>,
}

impl FakeRpcTransport {
    /// A transport with no answers configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// A node where everything a transfer needs succeeds: 1 ETH of gas
    /// balance, zero allowance, [`FAKE_USDC_BALANCE`] USDC, 1 gwei fees and
    /// receipts mined at the current head.
    pub fn healthy() -> Self {
        let transport = Self::new();
        transport.set_result("eth_getBalance", json!("0xde0b6b3a7640000"));
        transport.set_result("eth_estimateGas", json!("0x186a0"));
        transport.set_result("eth_gasPrice", json!("0x3b9aca00"));
        transport.set_result("eth_maxPriorityFeePerGas", json!("0x3b9aca00"));
        transport.set_result(
            "eth_getBlockByNumber",
            json!({ "number": "0x10", "baseFeePerGas": "0x3b9aca00" }),
        );
        transport.set_result("eth_blockNumber", json!("0x10"));
        transport.set_result(
            "eth_getTransactionReceipt",
            json!({ "blockNumber": "0x10", "status": "0x1", "gasUsed": "0x5208" }),
        );
        transport.set_result("eth_getTransactionByHash", json!({ "blockNumber": "0x10" }));
        transport.set_allowance(U256::ZERO);
        transport.set_usdc_balance(U256::from(FAKE_USDC_BALANCE));
        transport
    }

    pub fn set_result(&self, method: &str, result: Value) {
        self.state
            .lock()
            .unwrap()
            .results
            .insert(method.to_string(), result);
    }

    /// Queues a one-shot answer, consumed before the fixed result.
    pub fn push_result(&self, method: &str, result: Value) {
        self.state
            .lock()
            .unwrap()
            .queued
            .entry(method.to_string())
            .or_default()
            .push_back(result);
    }

    /// Answers `eth_call`s whose calldata starts with `selector`.
    pub fn set_call_result(&self, selector: [u8; 4], output: Bytes) {
        self.state
            .lock()
            .unwrap()
            .call_results
            .insert(selector, json!(output));
    }

    pub fn set_allowance(&self, allowance: U256) {
        self.set_call_result(IErc20::allowanceCall::SELECTOR, encode_uint256(allowance));
    }

    pub fn set_usdc_balance(&self, balance: U256) {
        self.set_call_result(IErc20::balanceOfCall::SELECTOR, encode_uint256(balance));
    }

    /// Every request to `endpoint` fails with `error` until healed.
    pub fn fail_endpoint(&self, endpoint: &Url, error: EndpointError) {
        self.state
            .lock()
            .unwrap()
            .endpoint_failures
            .insert(endpoint.clone(), error);
    }

    pub fn heal_endpoint(&self, endpoint: &Url) {
        self.state.lock().unwrap().endpoint_failures.remove(endpoint);
    }

    /// Every `method` request fails with `error`, on all endpoints.
    pub fn fail_method(&self, method: &str, error: EndpointError) {
        self.state
            .lock()
            .unwrap()
            .method_failures
            .insert(method.to_string(), error);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn calls_for(&self, method: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.method == method)
            .collect()
    }
}

fn encode_uint256(value: U256) -> Bytes {
    Bytes::from(value.to_be_bytes::<32>().to_vec())
}

fn call_selector(params: &Value) -> Option<[u8; 4]> {
    let tx = params.get(0)?;
    let input = tx
        .get("input")
        .and_then(Value::as_str)
        .or_else(|| tx.get("data").and_then(Value::as_str))?;
    let bytes = hex::decode(input).ok()?;
    bytes.get(..4)?.try_into().ok()
}

#[async_trait]
impl RpcTransport for FakeRpcTransport {
    async fn request(
        &self,
        endpoint: &Url,
        method: &str,
        params: Value,
    ) -> std::result::Result<Value, EndpointError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(RecordedCall {
            endpoint: endpoint.clone(),
            method: method.to_string(),
            params: params.clone(),
        });

        if let Some(error) = state.endpoint_failures.get(endpoint) {
            return Err(error.clone());
        }
        if let Some(error) = state.method_failures.get(method) {
            return Err(error.clone());
        }

        if method == "eth_call" {
            return call_selector(&params)
                .and_then(|selector| state.call_results.get(&selector).cloned())
                .ok_or_else(|| EndpointError::Rpc {
                    code: 3,
                    message: "execution reverted".to_string(),
                });
        }

        if let Some(result) = state.queued.get_mut(method).and_then(VecDeque::pop_front) {
            return Ok(result);
        }
        state
            .results
            .get(method)
            .cloned()
            .ok_or_else(|| EndpointError::Rpc {
                code: -32601,
                message: format!("the method {method} does not exist"),
            })
    }
}

// ============================================================================
// Fake Signer
// ============================================================================

/// A transaction accepted by [`FakeSigner`].
#[derive(Clone, Debug)]
pub struct SentTransaction {
    pub chain_id: u64,
    pub tx: TransactionRequest,
    pub tx_hash: TxHash,
}

#[derive(Debug, Default)]
struct SignerState {
    sent: Vec<SentTransaction>,
    attempts: usize,
    fail_any: usize,
    fail_on_chain: HashMap<u64, usize>,
}

/// A signer that hands out sequential transaction hashes.
#[derive(Clone, Debug)]
pub struct FakeSigner {
    address: Address,
    state: Arc<Mutex<SignerState>>,
}

impl FakeSigner {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            state: Arc::default(),
        }
    }

    /// The next `count` sends fail, whatever the chain.
    pub fn fail_next_sends(&self, count: usize) {
        self.state.lock().unwrap().fail_any = count;
    }

    /// The next `count` sends to `chain_id` fail.
    pub fn fail_sends_on(&self, chain_id: u64, count: usize) {
        self.state
            .lock()
            .unwrap()
            .fail_on_chain
            .insert(chain_id, count);
    }

    pub fn sent(&self) -> Vec<SentTransaction> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn sent_on(&self, chain_id: u64) -> Vec<SentTransaction> {
        self.sent()
            .into_iter()
            .filter(|sent| sent.chain_id == chain_id)
            .collect()
    }

    /// Sends attempted, failed ones included.
    pub fn attempts(&self) -> usize {
        self.state.lock().unwrap().attempts
    }
}

#[async_trait]
impl TransactionSigner for FakeSigner {
    fn address(&self) -> Address {
        self.address
    }

    async fn sign_and_send(&self, chain_id: u64, tx: TransactionRequest) -> Result<TxHash> {
        let mut state = self.state.lock().unwrap();
        state.attempts += 1;

        if state.fail_any > 0 {
            state.fail_any -= 1;
            return Err(CctpError::Provider("Simulated broadcast failure".to_string()));
        }
        if let Some(remaining) = state.fail_on_chain.get_mut(&chain_id) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(CctpError::Provider(format!(
                    "Simulated broadcast failure on chain {chain_id}"
                )));
            }
        }

        let tx_hash = B256::left_padding_from(&(state.sent.len() as u64 + 1).to_be_bytes());
        state.sent.push(SentTransaction {
            chain_id,
            tx,
            tx_hash,
        });
        Ok(tx_hash)
    }
}

// ============================================================================
// Fake Attestation Provider
// ============================================================================

/// One scripted answer of [`FakeAttestationProvider`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttestationOutcome {
    /// 404: the burn is not indexed yet.
    NotFound,
    Pending,
    PendingConfirmations,
    Complete { message: Bytes, attestation: Bytes },
    Failed,
    /// 429 with the given retry-after in seconds.
    RateLimited(u64),
    /// Any other HTTP error status.
    ServerError(u16),
}

impl AttestationOutcome {
    /// A completed attestation with recognizable payloads.
    pub fn complete() -> Self {
        Self::Complete {
            message: Bytes::from_static(&[0xde, 0xad, 0xbe, 0xef]),
            attestation: Bytes::from_static(&[0x12, 0x34, 0xab, 0xcd]),
        }
    }

    fn into_response(self) -> Result<V2AttestationResponse> {
        let message = |status, message, attestation| V2AttestationResponse {
            messages: vec![V2Message {
                status,
                message,
                attestation,
            }],
        };
        match self {
            Self::NotFound => Err(CctpError::AttestationNotFound),
            Self::Pending => Ok(message(AttestationStatus::Pending, None, None)),
            Self::PendingConfirmations => {
                Ok(message(AttestationStatus::PendingConfirmations, None, None))
            }
            Self::Complete {
                message: payload,
                attestation,
            } => Ok(message(
                AttestationStatus::Complete,
                Some(payload),
                Some(attestation),
            )),
            Self::Failed => Ok(message(AttestationStatus::Failed, None, None)),
            Self::RateLimited(retry_after_seconds) => Err(CctpError::RateLimitExceeded {
                retry_after_seconds,
            }),
            Self::ServerError(status) => {
                Err(CctpError::Provider(format!("Iris API returned HTTP {status}")))
            }
        }
    }
}

#[derive(Debug, Default)]
struct AttestationState {
    outcomes: VecDeque<AttestationOutcome>,
    last: Option<AttestationOutcome>,
    calls: Vec<(DomainId, TxHash)>,
}

/// Plays back scripted outcomes in order; the last one repeats forever.
#[derive(Clone, Debug, Default)]
pub struct FakeAttestationProvider {
    state: Arc<Mutex<AttestationState>>,
}

impl FakeAttestationProvider {
    pub fn new(outcomes: Vec<AttestationOutcome>) -> Self {
        Self {
            state: Arc::new(Mutex::new(AttestationState {
                outcomes: outcomes.into(),
                ..Default::default()
            })),
        }
    }

    /// Completes on the first request.
    pub fn completing() -> Self {
        Self::new(vec![AttestationOutcome::complete()])
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    pub fn calls(&self) -> Vec<(DomainId, TxHash)> {
        self.state.lock().unwrap().calls.clone()
    }
}

#[async_trait]
impl AttestationProvider for FakeAttestationProvider {
    async fn get_messages(
        &self,
        source_domain: DomainId,
        tx_hash: TxHash,
    ) -> Result<V2AttestationResponse> {
        let mut state = self.state.lock().unwrap();
        state.calls.push((source_domain, tx_hash));

        let outcome = match state.outcomes.pop_front() {
            Some(outcome) => {
                state.last = Some(outcome.clone());
                outcome
            }
            None => state.last.clone().unwrap_or(AttestationOutcome::NotFound),
        };
        outcome.into_response()
    }
}

// ============================================================================
// Fake Clock
// ============================================================================

/// A clock whose time only moves when something sleeps on it.
///
/// Sleeping records the duration, advances virtual time and yields once, so
/// other tasks (and cancellation) still get a chance to run.
#[derive(Clone, Debug)]
pub struct FakeClock {
    start: Instant,
    sleep_log: Arc<Mutex<Vec<Duration>>>,
}

impl Default for FakeClock {
    fn default() -> Self {
        Self {
            start: Instant::now(),
            sleep_log: Arc::default(),
        }
    }
}

impl FakeClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleep_log.lock().unwrap().clone()
    }

    pub fn total_sleep_time(&self) -> Duration {
        self.sleep_log.lock().unwrap().iter().sum()
    }
}

#[async_trait]
impl Clock for FakeClock {
    async fn sleep(&self, duration: Duration) {
        self.sleep_log.lock().unwrap().push(duration);
        tokio::task::yield_now().await;
    }

    fn now(&self) -> Instant {
        self.start + self.total_sleep_time()
    }
}

// ============================================================================
// Recording History Sink
// ============================================================================

/// Keeps every entry; optionally rejects them to exercise error paths.
#[derive(Clone, Debug, Default)]
pub struct RecordingHistorySink {
    entries: Arc<Mutex<Vec<HistoryEntry>>>,
    reject: bool,
}

impl RecordingHistorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that records entries and then reports an error.
    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::default()
        }
    }

    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl HistorySink for RecordingHistorySink {
    async fn record(&self, entry: &HistoryEntry) -> Result<()> {
        self.entries.lock().unwrap().push(entry.clone());
        if self.reject {
            return Err(CctpError::Provider("history endpoint unavailable".to_string()));
        }
        Ok(())
    }
}
