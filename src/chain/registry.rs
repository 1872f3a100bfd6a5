// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Static per-chain metadata lookup.

use alloy_chains::NamedChain;
use alloy_primitives::{Address, U256};
use bon::Builder;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;
use url::Url;

use super::CctpChain;
use crate::{CctpError, DomainId, Result};

/// Default native balance (0.01 of the gas token, in wei) required before minting.
pub const DEFAULT_MIN_GAS_BALANCE_WEI: u64 = 10_000_000_000_000_000;

/// Prefix of the environment variables that override a chain's endpoint list.
pub const RPC_URLS_ENV_PREFIX: &str = "CCTP_RPC_URLS_";

fn default_min_gas_balance() -> U256 {
    U256::from(DEFAULT_MIN_GAS_BALANCE_WEI)
}

/// Everything the orchestrator needs to know about one chain.
#[derive(Builder, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainDescriptor {
    pub chain: NamedChain,
    #[builder(into)]
    pub name: String,
    pub domain: DomainId,
    /// Tried in order; the first entry is the preferred endpoint.
    pub rpc_endpoints: Vec<Url>,
    pub usdc: Address,
    pub token_messenger: Address,
    pub message_transmitter: Address,
    /// Minimum native balance the signer must hold before a mint is attempted.
    #[serde(default = "default_min_gas_balance")]
    #[builder(default = default_min_gas_balance())]
    pub min_gas_balance: U256,
}

impl ChainDescriptor {
    /// Builds the descriptor for a chain from the built-in tables.
    pub fn for_chain(chain: NamedChain) -> Result<Self> {
        let rpc_endpoints = chain
            .default_rpc_urls()?
            .iter()
            .map(|raw| parse_endpoint(chain, raw))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::builder()
            .chain(chain)
            .name(chain.to_string())
            .domain(chain.cctp_domain_id()?)
            .rpc_endpoints(rpc_endpoints)
            .usdc(chain.usdc_address()?)
            .token_messenger(chain.token_messenger_v2_address()?)
            .message_transmitter(chain.message_transmitter_v2_address()?)
            .build())
    }

    #[inline]
    pub fn chain_id(&self) -> u64 {
        self.chain as u64
    }

    #[inline]
    pub fn is_testnet(&self) -> bool {
        self.chain.is_testnet()
    }
}

fn parse_endpoint(chain: NamedChain, raw: &str) -> Result<Url> {
    Url::parse(raw.trim())
        .map_err(|e| CctpError::InvalidConfig(format!("invalid RPC URL '{raw}' for {chain}: {e}")))
}

/// Read-only lookup from chain to [`ChainDescriptor`].
///
/// Built once at start-up and never mutated afterwards, so it can be shared
/// behind an `Arc` (or cloned) across any number of concurrent transfers.
///
/// ```rust
/// use cctp_orchestrator::ChainRegistry;
/// use alloy_chains::NamedChain;
///
/// # fn main() -> cctp_orchestrator::Result<()> {
/// let registry = ChainRegistry::testnet()?;
/// let sepolia = registry.resolve(NamedChain::Sepolia)?;
/// assert_eq!(sepolia.domain.as_u32(), 0);
/// assert!(registry.resolve(NamedChain::Mainnet).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ChainRegistry {
    chains: HashMap<NamedChain, ChainDescriptor>,
}

impl ChainRegistry {
    pub fn new(descriptors: impl IntoIterator<Item = ChainDescriptor>) -> Result<Self> {
        let mut chains = HashMap::new();
        for descriptor in descriptors {
            if descriptor.rpc_endpoints.is_empty() {
                return Err(CctpError::InvalidConfig(format!(
                    "{} has no RPC endpoints",
                    descriptor.chain
                )));
            }
            chains.insert(descriptor.chain, descriptor);
        }
        Ok(Self { chains })
    }

    /// Ethereum Sepolia, Avalanche Fuji, Base Sepolia and Arbitrum Sepolia.
    pub fn testnet() -> Result<Self> {
        Self::from_named(&[
            NamedChain::Sepolia,
            NamedChain::AvalancheFuji,
            NamedChain::BaseSepolia,
            NamedChain::ArbitrumSepolia,
        ])
    }

    /// Ethereum, Avalanche, Base and Arbitrum One.
    pub fn mainnet() -> Result<Self> {
        Self::from_named(&[
            NamedChain::Mainnet,
            NamedChain::Avalanche,
            NamedChain::Base,
            NamedChain::Arbitrum,
        ])
    }

    pub fn from_named(chains: &[NamedChain]) -> Result<Self> {
        Self::new(
            chains
                .iter()
                .map(|chain| ChainDescriptor::for_chain(*chain))
                .collect::<Result<Vec<_>>>()?,
        )
    }

    /// Parses a JSON array of descriptors.
    pub fn from_json(json: &str) -> Result<Self> {
        let descriptors: Vec<ChainDescriptor> = serde_json::from_str(json)?;
        Self::new(descriptors)
    }

    /// Replaces endpoint lists from `CCTP_RPC_URLS_<CHAIN>` variables (`.env` included).
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_endpoint_overrides(|key| dotenvy::var(key).ok())
    }

    /// Replaces endpoint lists with comma-separated values returned by `lookup`.
    ///
    /// `lookup` receives the variable name, e.g. `CCTP_RPC_URLS_BASE_SEPOLIA`.
    pub fn with_endpoint_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        for descriptor in self.chains.values_mut() {
            let key = endpoint_env_key(descriptor.chain);
            let Some(raw) = lookup(&key) else {
                continue;
            };

            let endpoints = raw
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(|s| parse_endpoint(descriptor.chain, s))
                .collect::<Result<Vec<_>>>()?;

            if endpoints.is_empty() {
                return Err(CctpError::InvalidConfig(format!("{key} is set but empty")));
            }

            debug!(chain = %descriptor.chain, endpoints = endpoints.len(), "RPC endpoints overridden");
            descriptor.rpc_endpoints = endpoints;
        }
        Ok(self)
    }

    /// Looks up a chain, failing with [`CctpError::UnknownChain`] when absent.
    pub fn resolve(&self, chain: NamedChain) -> Result<&ChainDescriptor> {
        self.chains
            .get(&chain)
            .ok_or_else(|| CctpError::UnknownChain {
                chain: chain.to_string(),
            })
    }

    pub fn contains(&self, chain: NamedChain) -> bool {
        self.chains.contains_key(&chain)
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &ChainDescriptor> {
        self.chains.values()
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

/// `CCTP_RPC_URLS_` followed by the upper-snake-case chain name.
pub fn endpoint_env_key(chain: NamedChain) -> String {
    format!(
        "{RPC_URLS_ENV_PREFIX}{}",
        chain.as_str().to_ascii_uppercase().replace('-', "_")
    )
}
