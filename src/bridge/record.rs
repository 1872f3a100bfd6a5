// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Transfer requests and the records that track them through the pipeline.

use alloy_chains::NamedChain;
use alloy_primitives::{Address, TxHash, U256};
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CctpError, ErrorKind, Result};
use crate::protocol::{AttestationMessage, TransferType};

/// Pipeline position of a transfer.
///
/// States only move forward, one step at a time, except that any
/// non-terminal state may drop to [`TransferState::Error`]. `Completed` and
/// `Error` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransferState {
    Idle,
    Approving,
    Burning,
    WaitingAttestation,
    Minting,
    Completed,
    Error,
}

impl TransferState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Approving => "approving",
            Self::Burning => "burning",
            Self::WaitingAttestation => "waiting-attestation",
            Self::Minting => "minting",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }

    const fn ordinal(&self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Approving => 1,
            Self::Burning => 2,
            Self::WaitingAttestation => 3,
            Self::Minting => 4,
            Self::Completed => 5,
            Self::Error => 6,
        }
    }

    pub const fn can_transition_to(&self, next: TransferState) -> bool {
        if self.is_terminal() {
            return false;
        }
        matches!(next, Self::Error) || next.ordinal() == self.ordinal() + 1
    }
}

impl fmt::Display for TransferState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the caller asks for: move `amount` USDC base units from
/// `source_chain` to `recipient` on `destination_chain`.
#[derive(Builder, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub source_chain: NamedChain,
    pub destination_chain: NamedChain,
    pub amount: U256,
    pub recipient: Address,
    #[builder(default)]
    #[serde(default)]
    pub transfer_type: TransferType,
    /// Defaults to `amount - 1` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_fee: Option<U256>,
}

impl TransferRequest {
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| {
            Err(CctpError::InvalidRequest {
                reason: reason.to_string(),
            })
        };

        if self.amount.is_zero() {
            return invalid("amount must be greater than zero");
        }
        if self.source_chain == self.destination_chain {
            return invalid("source and destination chains must differ");
        }
        if self.recipient.is_zero() {
            return invalid("recipient must not be the zero address");
        }
        if self.max_fee.is_some_and(|fee| fee >= self.amount) {
            return invalid("maxFee must be less than amount");
        }
        Ok(())
    }

    /// Fee cap passed to `depositForBurn`.
    pub fn effective_max_fee(&self) -> U256 {
        self.max_fee
            .unwrap_or_else(|| self.amount.saturating_sub(U256::from(1)))
    }
}

/// Parses a `0x`-prefixed 20-byte hex address supplied by a user.
pub fn parse_recipient(input: &str) -> Result<Address> {
    let trimmed = input.trim();
    if !trimmed.starts_with("0x") || trimmed.len() != 42 {
        return Err(CctpError::InvalidRequest {
            reason: format!("recipient {trimmed:?} is not a 0x-prefixed 20-byte address"),
        });
    }
    trimmed.parse().map_err(|e| CctpError::InvalidRequest {
        reason: format!("recipient {trimmed:?}: {e}"),
    })
}

/// Transfer identifier, `{source-chain}-{unix-seconds}` with a `-{n}`
/// suffix when two transfers start within the same second.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransferId(String);

impl TransferId {
    pub(crate) fn new(id: String) -> Self {
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TransferId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// One human-readable line of a transfer's log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferEvent {
    pub at: DateTime<Utc>,
    pub state: TransferState,
    pub message: String,
}

impl fmt::Display for TransferEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.at.format("%H:%M:%S"), self.message)
    }
}

/// Why a transfer ended in [`TransferState::Error`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferFailure {
    pub kind: ErrorKind,
    pub message: String,
}

/// Everything known about one transfer.
///
/// Records are only mutated by the state machine. Once terminal, every
/// mutation is refused with [`CctpError::InvalidStateTransition`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRecord {
    id: TransferId,
    request: TransferRequest,
    state: TransferState,
    events: Vec<TransferEvent>,
    approval_tx_hash: Option<TxHash>,
    source_tx_hash: Option<TxHash>,
    destination_tx_hash: Option<TxHash>,
    attestation: Option<AttestationMessage>,
    failure: Option<TransferFailure>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TransferRecord {
    pub(crate) fn new(id: TransferId, request: TransferRequest, now: DateTime<Utc>) -> Self {
        let message = format!(
            "Transfer of {} from {} to {} created",
            request.amount, request.source_chain, request.destination_chain
        );
        Self {
            id,
            request,
            state: TransferState::Idle,
            events: vec![TransferEvent {
                at: now,
                state: TransferState::Idle,
                message,
            }],
            approval_tx_hash: None,
            source_tx_hash: None,
            destination_tx_hash: None,
            attestation: None,
            failure: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &TransferId {
        &self.id
    }

    pub fn request(&self) -> &TransferRequest {
        &self.request
    }

    pub fn state(&self) -> TransferState {
        self.state
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn events(&self) -> &[TransferEvent] {
        &self.events
    }

    pub fn approval_tx_hash(&self) -> Option<TxHash> {
        self.approval_tx_hash
    }

    /// Hash of the `depositForBurn` transaction.
    pub fn source_tx_hash(&self) -> Option<TxHash> {
        self.source_tx_hash
    }

    /// Hash of the successful `receiveMessage` transaction.
    pub fn destination_tx_hash(&self) -> Option<TxHash> {
        self.destination_tx_hash
    }

    pub fn attestation(&self) -> Option<&AttestationMessage> {
        self.attestation.as_ref()
    }

    pub fn failure(&self) -> Option<&TransferFailure> {
        self.failure.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub(crate) fn transition(&mut self, next: TransferState, message: impl Into<String>) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(CctpError::InvalidStateTransition {
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        self.push_event(message.into());
        Ok(())
    }

    pub(crate) fn log(&mut self, message: impl Into<String>) -> Result<()> {
        self.ensure_open()?;
        self.push_event(message.into());
        Ok(())
    }

    pub(crate) fn fail(&mut self, error: &CctpError) -> Result<()> {
        self.transition(TransferState::Error, format!("Transfer failed: {error}"))?;
        self.failure = Some(TransferFailure {
            kind: error.kind(),
            message: error.to_string(),
        });
        Ok(())
    }

    pub(crate) fn set_approval_tx_hash(&mut self, tx_hash: TxHash) -> Result<()> {
        self.ensure_open()?;
        self.approval_tx_hash = Some(tx_hash);
        Ok(())
    }

    pub(crate) fn set_source_tx_hash(&mut self, tx_hash: TxHash) -> Result<()> {
        self.ensure_open()?;
        self.source_tx_hash = Some(tx_hash);
        Ok(())
    }

    pub(crate) fn set_destination_tx_hash(&mut self, tx_hash: TxHash) -> Result<()> {
        self.ensure_open()?;
        self.destination_tx_hash = Some(tx_hash);
        Ok(())
    }

    pub(crate) fn set_attestation(&mut self, attestation: AttestationMessage) -> Result<()> {
        self.ensure_open()?;
        self.attestation = Some(attestation);
        Ok(())
    }

    fn ensure_open(&self) -> Result<()> {
        if self.state.is_terminal() {
            return Err(CctpError::InvalidStateTransition {
                from: self.state,
                to: self.state,
            });
        }
        Ok(())
    }

    fn push_event(&mut self, message: String) {
        let now = Utc::now();
        self.updated_at = now;
        self.events.push(TransferEvent {
            at: now,
            state: self.state,
            message,
        });
    }
}
