// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! # cctp-orchestrator
//!
//! Drives USDC transfers across chains with Circle's Cross-Chain Transfer
//! Protocol (CCTP) v2.
//!
//! A transfer approves USDC, burns it on the source chain with
//! `depositForBurn`, waits for Circle's attestation and mints on the
//! destination chain with `receiveMessage`. Each step is tracked in a
//! [`TransferRecord`] whose state only moves forward:
//!
//! ```text
//! Idle → Approving → Burning → WaitingAttestation → Minting → Completed
//!                 ╲          ╲                    ╲          ╲
//!                  └──────────┴────────────────────┴──────────┴→ Error
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cctp_orchestrator::{
//!     ChainRegistry, ExecutorConfig, HttpRpcTransport, IrisAttestationProvider, TokioClock,
//!     TransferRequest, TransferStateMachine, TransferType,
//! };
//! use alloy_chains::NamedChain;
//! use alloy_primitives::{address, U256};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example<S: cctp_orchestrator::TransactionSigner>(signer: S) -> cctp_orchestrator::Result<()> {
//! let machine = TransferStateMachine::new(
//!     ChainRegistry::testnet()?.with_env_overrides()?,
//!     HttpRpcTransport::new()?,
//!     IrisAttestationProvider::sandbox()?,
//!     TokioClock,
//!     ExecutorConfig::from_env()?,
//! )?;
//!
//! let request = TransferRequest::builder()
//!     .source_chain(NamedChain::Sepolia)
//!     .destination_chain(NamedChain::ArbitrumSepolia)
//!     .amount(U256::from(1_000_000)) // 1 USDC
//!     .recipient(address!("742d35Cc6634C0532925a3b844Bc9e7595f8fA0d"))
//!     .transfer_type(TransferType::Fast)
//!     .build();
//!
//! let record = machine
//!     .execute(request, &signer, &CancellationToken::new())
//!     .await?;
//! for event in record.events() {
//!     println!("{event}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Seams
//!
//! Everything that touches the outside world sits behind a trait in
//! [`traits`], with production implementations in [`providers`] and
//! [`rpc`], and fakes in `testing` (behind the `testing` feature):
//!
//! - [`RpcTransport`]: one JSON-RPC request to one endpoint
//! - [`TransactionSigner`]: signing and broadcasting
//! - [`AttestationProvider`]: Circle's attestation API
//! - [`Clock`]: sleeping and reading time
//! - [`HistorySink`]: reporting terminal outcomes

mod bridge;
mod chain;
mod error;
mod protocol;

pub mod contracts;
pub mod gas;
pub mod providers;
pub mod rpc;
pub mod spans;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod traits;

pub use bridge::{
    parse_recipient, AttestationPoller, DepositForBurnParams, ExecutorConfig, HistoryEntry,
    PollingConfig, SubmissionStep, TransactionSubmitter, TransferEvent, TransferFailure,
    TransferHandle, TransferId, TransferRecord, TransferRegistry, TransferRequest, TransferState,
    TransferStateMachine, DEFAULT_APPROVAL_ALLOWANCE, DEFAULT_MINT_BACKOFF_SECS,
    DEFAULT_MINT_MAX_RETRIES, HISTORY_NOTIFY_TIMEOUT_SECS, IRIS_API, IRIS_API_SANDBOX,
    MESSAGES_PATH_V2,
};
pub use chain::{
    endpoint_env_key, CctpChain, ChainDescriptor, ChainRegistry,
    CCTP_V2_MESSAGE_TRANSMITTER_MAINNET, CCTP_V2_MESSAGE_TRANSMITTER_TESTNET,
    CCTP_V2_TOKEN_MESSENGER_MAINNET, CCTP_V2_TOKEN_MESSENGER_TESTNET,
    DEFAULT_MIN_GAS_BALANCE_WEI, RPC_URLS_ENV_PREFIX,
};
pub use error::{CctpError, EndpointError, ErrorKind, Result};
pub use protocol::{
    address_to_bytes32, bytes32_to_address, AttestationMessage, AttestationStatus, DomainId,
    TransferType, V2AttestationResponse, V2Message,
};
pub use providers::{
    HttpHistorySink, IrisAttestationProvider, NoopHistorySink, ProviderSigner, TokioClock,
};
pub use rpc::{HttpRpcTransport, MultiEndpointRpcClient, ReceiptSummary, RpcClientPool};
pub use traits::{AttestationProvider, Clock, HistorySink, RpcTransport, TransactionSigner};
