// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Circle Iris API attestation provider implementation.

use alloy_chains::NamedChain;
use alloy_primitives::TxHash;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, instrument, trace};

use crate::bridge::{IRIS_API, IRIS_API_SANDBOX, MESSAGES_PATH_V2};
use crate::error::{CctpError, Result};
use crate::protocol::{DomainId, V2AttestationResponse};
use crate::traits::AttestationProvider;

/// Wait applied when a 429 response carries no usable `Retry-After` header.
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 300;

/// Timeout of one Iris request.
pub const IRIS_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Production attestation provider using Circle's Iris API.
///
/// # Examples
///
/// ```rust,no_run
/// use cctp_orchestrator::{AttestationProvider, DomainId, IrisAttestationProvider};
/// use alloy_primitives::TxHash;
///
/// # async fn example() -> cctp_orchestrator::Result<()> {
/// let provider = IrisAttestationProvider::sandbox()?;
/// let response = provider.get_messages(DomainId::Ethereum, TxHash::ZERO).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct IrisAttestationProvider {
    base_url: String,
    client: Client,
}

impl IrisAttestationProvider {
    /// * `base_url` - Base URL for the Iris API (e.g., <https://iris-api.circle.com>)
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::builder()
                .timeout(Duration::from_secs(IRIS_REQUEST_TIMEOUT_SECS))
                .build()?,
        })
    }

    pub fn production() -> Result<Self> {
        Self::new(IRIS_API)
    }

    pub fn sandbox() -> Result<Self> {
        Self::new(IRIS_API_SANDBOX)
    }

    /// Sandbox for testnets, production otherwise.
    pub fn for_chain(chain: NamedChain) -> Result<Self> {
        if chain.is_testnet() {
            Self::sandbox()
        } else {
            Self::production()
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn messages_url(&self, source_domain: DomainId, tx_hash: TxHash) -> String {
        format!(
            "{}{}{}?transactionHash={}",
            self.base_url,
            MESSAGES_PATH_V2,
            source_domain.as_u32(),
            tx_hash
        )
    }
}

#[async_trait]
impl AttestationProvider for IrisAttestationProvider {
    #[instrument(skip(self), fields(source_domain = source_domain.as_u32(), tx_hash = %tx_hash))]
    async fn get_messages(
        &self,
        source_domain: DomainId,
        tx_hash: TxHash,
    ) -> Result<V2AttestationResponse> {
        let url = self.messages_url(source_domain, tx_hash);
        trace!(url = %url, "Requesting messages from Iris API");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        trace!(status_code = %status, "Received response from Iris API");

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);

            debug!(retry_after_seconds = retry_after, "Rate limit exceeded");
            return Err(CctpError::RateLimitExceeded {
                retry_after_seconds: retry_after,
            });
        }

        if status == StatusCode::NOT_FOUND {
            debug!("Burn not indexed yet");
            return Err(CctpError::AttestationNotFound);
        }

        if !status.is_success() {
            return Err(CctpError::AttestationFailed {
                reason: format!("Iris API returned HTTP {status}"),
            });
        }

        let messages: V2AttestationResponse = response.json().await?;
        debug!(
            messages = messages.messages.len(),
            status = ?messages.messages.first().map(|m| m.status),
            "Messages response parsed"
        );
        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_url() {
        let provider = IrisAttestationProvider::sandbox().unwrap();
        let url = provider.messages_url(DomainId::Base, TxHash::repeat_byte(0xab));
        insta::assert_snapshot!(url, @"https://iris-api-sandbox.circle.com/v2/messages/6?transactionHash=0xabababababababababababababababababababababababababababababababab");
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let provider = IrisAttestationProvider::new("http://localhost:8080/").unwrap();
        assert_eq!(
            provider.messages_url(DomainId::Ethereum, TxHash::ZERO),
            format!("http://localhost:8080/v2/messages/0?transactionHash={}", TxHash::ZERO)
        );
    }

    #[test]
    fn test_environment_follows_chain() {
        assert_eq!(
            IrisAttestationProvider::for_chain(NamedChain::Sepolia)
                .unwrap()
                .base_url(),
            IRIS_API_SANDBOX
        );
        assert_eq!(
            IrisAttestationProvider::for_chain(NamedChain::Arbitrum)
                .unwrap()
                .base_url(),
            IRIS_API
        );
    }
}
