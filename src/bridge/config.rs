// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use alloy_primitives::U256;
use bon::Builder;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{CctpError, Result};
use crate::gas::{DEFAULT_FEE_MULTIPLIER, DEFAULT_GAS_BUFFER_PERCENT};

/// Circle Iris API environment URLs
///
/// See <https://developers.circle.com/stablecoins/cctp-apis>
pub const IRIS_API: &str = "https://iris-api.circle.com";
pub const IRIS_API_SANDBOX: &str = "https://iris-api-sandbox.circle.com";

/// CCTP v2 messages API path: `/v2/messages/{sourceDomain}?transactionHash={txHash}`
pub const MESSAGES_PATH_V2: &str = "/v2/messages/";

/// Allowance granted on first use: 10 000 USDC in 6-decimal base units.
pub const DEFAULT_APPROVAL_ALLOWANCE: u64 = 10_000_000_000;
pub const DEFAULT_MINT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_MINT_BACKOFF_SECS: u64 = 2;
pub const DEFAULT_CONFIRMATIONS: u64 = 1;
pub const MAX_CONFIRMATIONS: u64 = 12;
pub const DEFAULT_RECEIPT_TIMEOUT_SECS: u64 = 120;
pub const MIN_RECEIPT_TIMEOUT_SECS: u64 = 10;
pub const MAX_RECEIPT_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_RECEIPT_POLL_INTERVAL_SECS: u64 = 1;
pub const DEFAULT_ATTESTATION_POLL_INTERVAL_SECS: u64 = 5;
pub const DEFAULT_ATTESTATION_TIMEOUT_SECS: u64 = 30 * 60;
/// Longest a transfer waits on its history sink before giving up on it.
pub const HISTORY_NOTIFY_TIMEOUT_SECS: u64 = 15;

/// Configuration for attestation polling behavior.
///
/// # Examples
///
/// ```rust
/// use cctp_orchestrator::PollingConfig;
/// use std::time::Duration;
///
/// // 5 second interval, 30 minute budget
/// let config = PollingConfig::default();
///
/// let config = PollingConfig::default().with_timeout(Duration::from_secs(600));
/// assert_eq!(config.max_attempts(), 121);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingConfig {
    /// Wait between two requests to the attestation service.
    pub poll_interval: Duration,
    /// Overall budget; the poller gives up with `AttestationTimeout` once it is spent.
    pub timeout: Duration,
}

impl Default for PollingConfig {
    /// Standard transfers take 13-19 minutes to be attested on most chains,
    /// so the default budget is 30 minutes.
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(DEFAULT_ATTESTATION_POLL_INTERVAL_SECS),
            timeout: Duration::from_secs(DEFAULT_ATTESTATION_TIMEOUT_SECS),
        }
    }
}

impl PollingConfig {
    /// Fast transfers are usually attested in under 30 seconds; 5 minutes is plenty.
    pub fn fast_transfer() -> Self {
        Self {
            poll_interval: Duration::from_secs(DEFAULT_ATTESTATION_POLL_INTERVAL_SECS),
            timeout: Duration::from_secs(5 * 60),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Upper bound on requests made within the timeout, first request included.
    pub fn max_attempts(&self) -> u64 {
        let interval = self.poll_interval.as_millis().max(1);
        (self.timeout.as_millis() / interval) as u64 + 1
    }
}

/// Tunables of the transfer pipeline.
///
/// Every field has a default, so `ExecutorConfig::default()` (or
/// `ExecutorConfig::builder().build()`) is a working production configuration.
///
/// ```rust
/// use cctp_orchestrator::ExecutorConfig;
/// use std::time::Duration;
///
/// let config = ExecutorConfig::builder()
///     .mint_max_retries(5)
///     .confirmations(40)
///     .build();
///
/// assert_eq!(config.mint_max_retries(), 5);
/// assert_eq!(config.confirmations(), 12);
/// assert_eq!(config.mint_backoff(), Duration::from_secs(2));
/// ```
#[derive(Builder, Debug, Clone, PartialEq, Eq)]
pub struct ExecutorConfig {
    #[builder(default = U256::from(DEFAULT_APPROVAL_ALLOWANCE))]
    approval_allowance: U256,
    #[builder(default = DEFAULT_MINT_MAX_RETRIES)]
    mint_max_retries: u32,
    #[builder(default = Duration::from_secs(DEFAULT_MINT_BACKOFF_SECS))]
    mint_backoff: Duration,
    #[builder(default = DEFAULT_GAS_BUFFER_PERCENT)]
    gas_buffer_percent: u64,
    #[builder(default = DEFAULT_FEE_MULTIPLIER)]
    fee_multiplier: u128,
    #[builder(default = DEFAULT_CONFIRMATIONS)]
    confirmations: u64,
    #[builder(default = Duration::from_secs(DEFAULT_RECEIPT_TIMEOUT_SECS))]
    receipt_timeout: Duration,
    #[builder(default = Duration::from_secs(DEFAULT_RECEIPT_POLL_INTERVAL_SECS))]
    receipt_poll_interval: Duration,
    #[builder(default)]
    polling: PollingConfig,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ExecutorConfig {
    /// Reads `CCTP_*` overrides from the process environment and `.env`.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `CCTP_APPROVAL_ALLOWANCE` | 10 000 USDC |
    /// | `CCTP_MINT_MAX_RETRIES` | 3 |
    /// | `CCTP_MINT_BACKOFF_SECS` | 2 |
    /// | `CCTP_GAS_BUFFER_PERCENT` | 50 |
    /// | `CCTP_FEE_MULTIPLIER` | 2 |
    /// | `CCTP_CONFIRMATIONS` | 1 |
    /// | `CCTP_RECEIPT_TIMEOUT_SECS` | 120 |
    /// | `CCTP_ATTESTATION_POLL_INTERVAL_SECS` | 5 |
    /// | `CCTP_ATTESTATION_TIMEOUT_SECS` | 1800 |
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| dotenvy::var(key).ok())
    }

    /// Same as [`ExecutorConfig::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = PollingConfig::default();
        let polling = PollingConfig {
            poll_interval: parse_var::<u64, _>(&lookup, "CCTP_ATTESTATION_POLL_INTERVAL_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.poll_interval),
            timeout: parse_var::<u64, _>(&lookup, "CCTP_ATTESTATION_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        };

        Ok(Self::builder()
            .maybe_approval_allowance(parse_var(&lookup, "CCTP_APPROVAL_ALLOWANCE")?)
            .maybe_mint_max_retries(parse_var(&lookup, "CCTP_MINT_MAX_RETRIES")?)
            .maybe_mint_backoff(
                parse_var(&lookup, "CCTP_MINT_BACKOFF_SECS")?.map(Duration::from_secs),
            )
            .maybe_gas_buffer_percent(parse_var(&lookup, "CCTP_GAS_BUFFER_PERCENT")?)
            .maybe_fee_multiplier(parse_var(&lookup, "CCTP_FEE_MULTIPLIER")?)
            .maybe_confirmations(parse_var(&lookup, "CCTP_CONFIRMATIONS")?)
            .maybe_receipt_timeout(
                parse_var(&lookup, "CCTP_RECEIPT_TIMEOUT_SECS")?.map(Duration::from_secs),
            )
            .polling(polling)
            .build())
    }

    /// Allowance requested when the current one does not cover a transfer.
    pub fn approval_allowance(&self) -> U256 {
        self.approval_allowance
    }

    /// Retries of `receiveMessage` after the first attempt.
    pub fn mint_max_retries(&self) -> u32 {
        self.mint_max_retries
    }

    /// Backoff unit; retry `n` waits `n * mint_backoff`.
    pub fn mint_backoff(&self) -> Duration {
        self.mint_backoff
    }

    pub fn gas_buffer_percent(&self) -> u64 {
        self.gas_buffer_percent
    }

    pub fn fee_multiplier(&self) -> u128 {
        self.fee_multiplier
    }

    /// Confirmations awaited per transaction, clamped to `1..=12`.
    pub fn confirmations(&self) -> u64 {
        self.confirmations.clamp(1, MAX_CONFIRMATIONS)
    }

    /// Receipt wait budget, clamped to `10s..=300s`.
    pub fn receipt_timeout(&self) -> Duration {
        self.receipt_timeout.clamp(
            Duration::from_secs(MIN_RECEIPT_TIMEOUT_SECS),
            Duration::from_secs(MAX_RECEIPT_TIMEOUT_SECS),
        )
    }

    pub fn receipt_poll_interval(&self) -> Duration {
        self.receipt_poll_interval
    }

    pub fn polling(&self) -> PollingConfig {
        self.polling
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| CctpError::InvalidConfig(format!("{key}={raw}: {e}")))
        })
        .transpose()
}
