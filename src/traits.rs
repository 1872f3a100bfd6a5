// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Core trait abstractions for the transfer pipeline.
//!
//! Every effect the orchestrator has on the outside world goes through one of
//! these traits: JSON-RPC traffic, the attestation API, signing, the clock and
//! the history sink. Production implementations live in [`crate::providers`]
//! and [`crate::rpc`]; fakes for tests live in `testing`.
//!
//! # Example: Implementing a Test Fake
//!
//! ```rust,ignore
//! use cctp_orchestrator::{AttestationProvider, DomainId, V2AttestationResponse, Result};
//!
//! struct AlwaysPending;
//!
//! #[async_trait::async_trait]
//! impl AttestationProvider for AlwaysPending {
//!     async fn get_messages(&self, _: DomainId, _: TxHash) -> Result<V2AttestationResponse> {
//!         Ok(serde_json::from_str(r#"{"messages":[{"status":"pending"}]}"#)?)
//!     }
//! }
//! ```

use alloy_primitives::{Address, TxHash};
use alloy_rpc_types::TransactionRequest;
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

use crate::bridge::HistoryEntry;
use crate::error::{EndpointError, Result};
use crate::protocol::{DomainId, V2AttestationResponse};

/// A single JSON-RPC round trip against one endpoint.
///
/// Implementations must classify failures: rate limits and connection-level
/// problems are [`EndpointError::RateLimited`] / [`EndpointError::Unavailable`]
/// so that [`MultiEndpointRpcClient`](crate::MultiEndpointRpcClient) can fail over.
///
/// # Test Scenarios
///
/// Implementing this trait with fakes enables testing:
/// - Endpoints that always answer 429
/// - Connection refused on the preferred endpoint
/// - Reverts surfaced as JSON-RPC error objects
/// - Receipts that never show up (dropped transactions)
#[async_trait]
pub trait RpcTransport: Send + Sync {
    async fn request(
        &self,
        endpoint: &Url,
        method: &str,
        params: serde_json::Value,
    ) -> std::result::Result<serde_json::Value, EndpointError>;
}

/// Trait for attestation retrieval from Circle's Iris API.
///
/// # Test Scenarios
///
/// - Not indexed yet (404), surfaced as [`CctpError::AttestationNotFound`](crate::CctpError::AttestationNotFound)
/// - Rate limiting (429), surfaced as [`CctpError::RateLimitExceeded`](crate::CctpError::RateLimitExceeded)
/// - `pending` → `complete` progressions
/// - Failed attestations
#[async_trait]
pub trait AttestationProvider: Send + Sync {
    /// Fetches the messages emitted by `tx_hash` on `source_domain`.
    async fn get_messages(
        &self,
        source_domain: DomainId,
        tx_hash: TxHash,
    ) -> Result<V2AttestationResponse>;
}

/// Trait for time-based operations.
///
/// Uses [`tokio::time::Instant`] so that paused-time tests observe the same
/// clock as `tokio::time::sleep`.
#[async_trait]
pub trait Clock: Send + Sync {
    async fn sleep(&self, duration: Duration);

    fn now(&self) -> Instant;
}

/// Signs and broadcasts transactions for one account.
///
/// The signer owns nonce management. Callers must not run two transfers with
/// the same signer concurrently.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    /// Account that pays gas and owns the burned tokens.
    fn address(&self) -> Address;

    /// Signs `tx` for `chain_id` and broadcasts it, returning the transaction hash.
    async fn sign_and_send(&self, chain_id: u64, tx: TransactionRequest) -> Result<TxHash>;
}

/// Receives the outcome of every transfer that reaches a terminal state.
///
/// Called once per transfer. Errors are logged and otherwise ignored.
#[async_trait]
pub trait HistorySink: Send + Sync {
    async fn record(&self, entry: &HistoryEntry) -> Result<()>;
}
