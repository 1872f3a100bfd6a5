// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Transfer orchestration
//!
//! A transfer moves `Idle → Approving → Burning → WaitingAttestation →
//! Minting → Completed`, dropping to `Error` on the first unrecovered failure.
//! [`TransferStateMachine`] drives it, [`TransactionSubmitter`] sends the
//! contract calls, [`AttestationPoller`] waits for Circle's signature and
//! [`TransferRegistry`] keeps every record observable.

mod config;
mod history;
mod params;
mod poller;
mod record;
mod registry;
mod state_machine;
mod submitter;

pub use config::{
    ExecutorConfig, PollingConfig, DEFAULT_APPROVAL_ALLOWANCE, DEFAULT_MINT_BACKOFF_SECS,
    DEFAULT_MINT_MAX_RETRIES, HISTORY_NOTIFY_TIMEOUT_SECS, IRIS_API, IRIS_API_SANDBOX,
    MESSAGES_PATH_V2,
};
pub use history::HistoryEntry;
pub use params::DepositForBurnParams;
pub use poller::AttestationPoller;
pub use record::{
    parse_recipient, TransferEvent, TransferFailure, TransferId, TransferRecord, TransferRequest,
    TransferState,
};
pub use registry::TransferRegistry;
pub use state_machine::{TransferHandle, TransferStateMachine};
pub use submitter::{SubmissionStep, TransactionSubmitter};
