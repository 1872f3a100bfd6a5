// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! OpenTelemetry span helpers for transfer operations
//!
//! Span names are static (`cctp.<operation>`) and carry structured attributes,
//! keeping instrumentation out of the business logic. The orchestrator attaches
//! them with [`tracing::Instrument`]; they are public so callers can reuse them
//! around their own steps.
//!
//! # Example
//!
//! ```rust,no_run
//! use cctp_orchestrator::{spans, DomainId};
//! use alloy_primitives::TxHash;
//! use tracing::Instrument;
//!
//! # async fn example() {
//! let span = spans::poll_attestation(TxHash::ZERO, DomainId::Base, 5, 1800);
//! async {
//!     // custom polling logic
//! }
//! .instrument(span)
//! .await;
//! # }
//! ```

use alloy_chains::NamedChain;
use alloy_primitives::{TxHash, U256};
use tracing::Span;

use crate::bridge::SubmissionStep;
use crate::protocol::{DomainId, TransferType};

/// Create span covering one transfer from `Idle` to a terminal state.
///
/// Parent: caller span (or none for spawned transfers)
/// Children: cctp.submit_transaction, cctp.poll_attestation
#[inline]
pub fn execute_transfer(
    transfer_id: &str,
    source_chain: &NamedChain,
    destination_chain: &NamedChain,
    amount: &U256,
    transfer_type: TransferType,
) -> Span {
    tracing::info_span!(
        "cctp.execute_transfer",
        transfer_id = transfer_id,
        source_chain = %source_chain,
        destination_chain = %destination_chain,
        amount = %amount,
        transfer_type = transfer_type.as_str(),
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for building, signing and sending one contract call.
///
/// Parent: cctp.execute_transfer
/// Children: cctp.rpc_call (gas and fee queries)
#[inline]
pub fn submit_transaction(step: SubmissionStep, chain: &NamedChain, attempt: u32) -> Span {
    tracing::info_span!(
        "cctp.submit_transaction",
        step = %step,
        chain = %chain,
        attempt = attempt,
        tx_hash = tracing::field::Empty,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for waiting on a receipt and its confirmations.
///
/// Parent: cctp.execute_transfer
/// Children: cctp.rpc_call (receipt and head polling)
#[inline]
pub fn wait_for_receipt(tx_hash: TxHash, chain: &NamedChain, confirmations: u64) -> Span {
    tracing::debug_span!(
        "cctp.wait_for_receipt",
        tx_hash = %tx_hash,
        chain = %chain,
        required_confirmations = confirmations,
    )
}

/// Create span for the attestation polling loop.
///
/// Parent: cctp.execute_transfer
/// Children: HTTP client request spans
#[inline]
pub fn poll_attestation(
    tx_hash: TxHash,
    source_domain: DomainId,
    poll_interval_secs: u64,
    timeout_secs: u64,
) -> Span {
    tracing::info_span!(
        "cctp.poll_attestation",
        tx_hash = %tx_hash,
        source_domain = source_domain.as_u32(),
        poll_interval_secs = poll_interval_secs,
        timeout_secs = timeout_secs,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for a single JSON-RPC call (including failover attempts).
///
/// Parent: Operation span
/// Children: None
#[inline]
pub fn rpc_call(method: &str, chain: &NamedChain) -> Span {
    tracing::trace_span!("cctp.rpc_call", rpc.method = method, rpc.chain = %chain)
}

/// Record error attributes on the current span.
///
/// Follows OpenTelemetry semantic conventions: `error.type`, `error.message`,
/// `error.source` and `otel.status_code = "ERROR"`.
pub fn record_error<E: std::error::Error>(error: &E) {
    let current_span = tracing::Span::current();
    let message = error.to_string();
    current_span.record(
        "error.type",
        message.split(':').next().unwrap_or("Unknown"),
    );
    current_span.record("error.message", message.as_str());
    current_span.record("otel.status_code", "ERROR");

    if let Some(source) = error.source() {
        current_span.record("error.source", source.to_string());
    }
}
