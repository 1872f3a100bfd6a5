// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use alloy_primitives::TxHash;
use std::time::Duration;
use tracing::{debug, info, warn, Instrument};

use super::config::PollingConfig;
use crate::error::{CctpError, Result};
use crate::protocol::{AttestationMessage, AttestationStatus, DomainId};
use crate::spans;
use crate::traits::{AttestationProvider, Clock};

/// Polls the attestation service until Circle has signed a burn.
#[derive(Debug, Clone)]
pub struct AttestationPoller<A, C> {
    provider: A,
    clock: C,
    config: PollingConfig,
}

impl<A: AttestationProvider, C: Clock> AttestationPoller<A, C> {
    pub fn new(provider: A, clock: C, config: PollingConfig) -> Self {
        Self {
            provider,
            clock,
            config,
        }
    }

    pub fn config(&self) -> PollingConfig {
        self.config
    }

    /// Waits for the attestation of the burn in `tx_hash` on `source_domain`.
    ///
    /// "Not found yet" and pending answers are retried every poll interval, and
    /// a rate limit waits for the advertised retry-after. A `failed` status or
    /// any other service error ends polling with
    /// [`CctpError::AttestationFailed`]; running out of time ends it with
    /// [`CctpError::AttestationTimeout`]. A request still in flight when the
    /// timeout runs out is abandoned.
    pub async fn poll(&self, source_domain: DomainId, tx_hash: TxHash) -> Result<AttestationMessage> {
        let span = spans::poll_attestation(
            tx_hash,
            source_domain,
            self.config.poll_interval.as_secs(),
            self.config.timeout.as_secs(),
        );

        async {
            let result = self.poll_inner(source_domain, tx_hash).await;
            if let Err(ref e) = result {
                spans::record_error(e);
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn poll_inner(&self, source_domain: DomainId, tx_hash: TxHash) -> Result<AttestationMessage> {
        let started = self.clock.now();
        let mut attempt = 0u64;

        loop {
            attempt += 1;
            let remaining = self
                .config
                .timeout
                .saturating_sub(self.clock.now().duration_since(started));
            let response = tokio::time::timeout(
                remaining,
                self.provider.get_messages(source_domain, tx_hash),
            )
            .await
            .map_err(|_| {
                warn!(
                    tx_hash = %tx_hash,
                    attempts = attempt,
                    event = "attestation_timeout",
                    "Attestation request outlived the polling timeout"
                );
                CctpError::AttestationTimeout
            })?;

            let wait = match response {
                Ok(response) => match response.messages.first() {
                    Some(message) => {
                        if let Some(attestation) = message.completed() {
                            info!(
                                tx_hash = %tx_hash,
                                attempt,
                                event = "attestation_complete"
                            );
                            return Ok(attestation);
                        }
                        if message.status == AttestationStatus::Failed {
                            return Err(CctpError::AttestationFailed {
                                reason: format!("attestation service reported failure for {tx_hash}"),
                            });
                        }
                        debug!(
                            tx_hash = %tx_hash,
                            attempt,
                            status = ?message.status,
                            event = "attestation_pending"
                        );
                        self.config.poll_interval
                    }
                    None => {
                        debug!(tx_hash = %tx_hash, attempt, event = "attestation_pending", "No messages indexed yet");
                        self.config.poll_interval
                    }
                },
                Err(CctpError::AttestationNotFound) => {
                    debug!(tx_hash = %tx_hash, attempt, event = "attestation_pending", "Burn not indexed yet");
                    self.config.poll_interval
                }
                Err(CctpError::RateLimitExceeded {
                    retry_after_seconds,
                }) => {
                    warn!(
                        tx_hash = %tx_hash,
                        attempt,
                        retry_after_seconds,
                        event = "attestation_rate_limited"
                    );
                    Duration::from_secs(retry_after_seconds)
                }
                Err(e @ CctpError::AttestationFailed { .. }) => return Err(e),
                Err(e) => {
                    return Err(CctpError::AttestationFailed {
                        reason: e.to_string(),
                    })
                }
            };

            let elapsed = self.clock.now().duration_since(started);
            if elapsed >= self.config.timeout {
                warn!(
                    tx_hash = %tx_hash,
                    attempts = attempt,
                    elapsed_secs = elapsed.as_secs(),
                    event = "attestation_timeout"
                );
                return Err(CctpError::AttestationTimeout);
            }
            self.clock.sleep(wait.min(self.config.timeout - elapsed)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{AttestationOutcome, FakeAttestationProvider, FakeClock};
    use alloy_primitives::Bytes;

    fn poller(outcomes: Vec<AttestationOutcome>, timeout_secs: u64) -> (AttestationPoller<FakeAttestationProvider, FakeClock>, FakeAttestationProvider, FakeClock) {
        let provider = FakeAttestationProvider::new(outcomes);
        let clock = FakeClock::new();
        let config = PollingConfig::default().with_timeout(Duration::from_secs(timeout_secs));
        (
            AttestationPoller::new(provider.clone(), clock.clone(), config),
            provider,
            clock,
        )
    }

    fn complete() -> AttestationOutcome {
        AttestationOutcome::Complete {
            message: Bytes::from_static(&[0xaa; 4]),
            attestation: Bytes::from_static(&[0xbb; 4]),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_until_complete() {
        let (poller, provider, clock) = poller(
            vec![
                AttestationOutcome::NotFound,
                AttestationOutcome::Pending,
                complete(),
            ],
            60,
        );

        let attestation = poller.poll(DomainId::Ethereum, TxHash::ZERO).await.unwrap();

        assert_eq!(attestation.message, Bytes::from_static(&[0xaa; 4]));
        assert_eq!(provider.call_count(), 3);
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(5); 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_waits_retry_after() {
        let (poller, _, clock) = poller(
            vec![AttestationOutcome::RateLimited(30), complete()],
            600,
        );

        poller.poll(DomainId::Base, TxHash::ZERO).await.unwrap();
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(30)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_status_stops_polling() {
        let (poller, provider, _) = poller(vec![AttestationOutcome::Failed], 60);

        let err = poller.poll(DomainId::Base, TxHash::ZERO).await.unwrap_err();
        assert!(matches!(err, CctpError::AttestationFailed { .. }));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_service_error_is_fatal() {
        let (poller, _, _) = poller(vec![AttestationOutcome::ServerError(500)], 60);

        let err = poller.poll(DomainId::Base, TxHash::ZERO).await.unwrap_err();
        assert!(matches!(err, CctpError::AttestationFailed { .. }));
    }

    struct UnresponsiveProvider;

    #[async_trait::async_trait]
    impl AttestationProvider for UnresponsiveProvider {
        async fn get_messages(
            &self,
            _source_domain: DomainId,
            _tx_hash: TxHash,
        ) -> Result<crate::protocol::V2AttestationResponse> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_unanswered_request_times_out() {
        let poller = AttestationPoller::new(
            UnresponsiveProvider,
            crate::providers::TokioClock,
            PollingConfig::default().with_timeout(Duration::from_secs(20)),
        );
        let started = tokio::time::Instant::now();

        let err = poller.poll(DomainId::Base, TxHash::ZERO).await.unwrap_err();

        assert!(matches!(err, CctpError::AttestationTimeout));
        assert_eq!(started.elapsed(), Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out() {
        let (poller, provider, _) = poller(vec![AttestationOutcome::Pending], 20);

        let err = poller.poll(DomainId::Base, TxHash::ZERO).await.unwrap_err();
        assert!(matches!(err, CctpError::AttestationTimeout));
        // t = 0, 5, 10, 15, 20
        assert_eq!(provider.call_count(), 5);
    }
}
