// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use alloy_primitives::{TxHash, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bridge::{SubmissionStep, TransferState};

#[derive(Error, Debug)]
pub enum CctpError {
    #[error("Unknown chain: {chain}")]
    UnknownChain { chain: String },

    #[error("Invalid transfer request: {reason}")]
    InvalidRequest { reason: String },

    #[error("All {attempts} RPC endpoints exhausted for {chain}: {last_error}")]
    AllEndpointsExhausted {
        chain: String,
        attempts: usize,
        last_error: String,
    },

    #[error("RPC error {code}: {message}")]
    RpcResponse { code: i64, message: String },

    #[error("Transaction failed during {step}: {reason}")]
    TransactionFailed {
        step: SubmissionStep,
        reason: String,
    },

    #[error("Timed out waiting for {operation}")]
    Timeout { operation: String },

    #[error("Receipt unavailable for {tx_hash}: transaction was dropped")]
    ReceiptUnavailable { tx_hash: TxHash },

    #[error("Attestation failed: {reason}")]
    AttestationFailed { reason: String },

    #[error("Rate limit exceeded, retry after {retry_after_seconds} seconds")]
    RateLimitExceeded { retry_after_seconds: u64 },

    #[error("Attestation not found (will retry)")]
    AttestationNotFound,

    #[error("Timeout waiting for attestation")]
    AttestationTimeout,

    #[error("Insufficient gas funds on {chain}: balance {balance}, required {required}")]
    InsufficientGasFunds {
        chain: String,
        balance: U256,
        required: U256,
    },

    #[error("Transfer cancelled")]
    Cancelled,

    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition {
        from: TransferState,
        to: TransferState,
    },

    #[error("Transfer not found: {0}")]
    TransferNotFound(String),

    #[error("Transfer task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("ABI encoding/decoding error: {0}")]
    Abi(#[from] alloy_sol_types::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Hex conversion error: {0}")]
    Hex(#[from] alloy_primitives::hex::FromHexError),
}

pub type Result<T> = std::result::Result<T, CctpError>;

/// Coarse classification of a [`CctpError`], stored on failed transfer records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnknownChain,
    InvalidRequest,
    AllEndpointsExhausted,
    TransactionFailed,
    Timeout,
    ReceiptUnavailable,
    AttestationTimeout,
    AttestationFailed,
    InsufficientGasFunds,
    Cancelled,
    Internal,
}

impl CctpError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownChain { .. } => ErrorKind::UnknownChain,
            Self::InvalidRequest { .. } => ErrorKind::InvalidRequest,
            Self::AllEndpointsExhausted { .. } => ErrorKind::AllEndpointsExhausted,
            Self::TransactionFailed { .. } => ErrorKind::TransactionFailed,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::ReceiptUnavailable { .. } => ErrorKind::ReceiptUnavailable,
            Self::AttestationTimeout => ErrorKind::AttestationTimeout,
            Self::AttestationFailed { .. }
            | Self::AttestationNotFound
            | Self::RateLimitExceeded { .. } => ErrorKind::AttestationFailed,
            Self::InsufficientGasFunds { .. } => ErrorKind::InsufficientGasFunds,
            Self::Cancelled => ErrorKind::Cancelled,
            _ => ErrorKind::Internal,
        }
    }

    /// Wraps any error raised while submitting `step` as a transaction failure.
    ///
    /// Cancellation passes through untouched so the caller still sees it.
    pub(crate) fn into_step_failure(self, step: SubmissionStep) -> Self {
        match self {
            Self::Cancelled | Self::TransactionFailed { .. } => self,
            other => Self::TransactionFailed {
                step,
                reason: other.to_string(),
            },
        }
    }
}

/// Failure of a single JSON-RPC endpoint.
///
/// Only [`EndpointError::RateLimited`] and [`EndpointError::Unavailable`] make the
/// multi-endpoint client rotate to the next URL; the other variants are answers
/// from a healthy node and are returned as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EndpointError {
    #[error("rate limited")]
    RateLimited,

    #[error("endpoint unavailable: {0}")]
    Unavailable(String),

    #[error("JSON-RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl EndpointError {
    #[inline]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited | Self::Unavailable(_))
    }
}
