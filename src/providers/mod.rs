// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Production implementations of the traits in [`crate::traits`]: Circle's
//! Iris API, the tokio clock, Alloy-backed signing and history sinks.
//!
//! Test code uses the fakes in `testing` instead.

mod history;
mod iris;
mod signer;
mod tokio_clock;

pub use self::history::{HttpHistorySink, NoopHistorySink, HISTORY_REQUEST_TIMEOUT_SECS};
pub use self::iris::{IrisAttestationProvider, DEFAULT_RETRY_AFTER_SECS};
pub use self::signer::ProviderSigner;
pub use self::tokio_clock::TokioClock;
