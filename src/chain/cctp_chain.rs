// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Built-in per-chain CCTP metadata, implemented on `alloy_chains::NamedChain`.

use alloy_chains::NamedChain;
use alloy_primitives::Address;

use super::addresses::*;
use crate::{CctpError, DomainId, Result};

/// CCTP v2 metadata for a named chain.
///
/// This is the single canonical source for domain ids and contract addresses.
/// [`ChainRegistry`](crate::ChainRegistry) builds its default tables from it.
///
/// ```rust
/// use cctp_orchestrator::{CctpChain, DomainId};
/// use alloy_chains::NamedChain;
///
/// assert_eq!(NamedChain::BaseSepolia.cctp_domain_id().unwrap(), DomainId::Base);
/// assert!(NamedChain::Moonbeam.cctp_domain_id().is_err());
/// ```
pub trait CctpChain {
    fn cctp_domain_id(&self) -> Result<DomainId>;

    /// USDC token contract, burned on the source chain.
    fn usdc_address(&self) -> Result<Address>;

    fn token_messenger_v2_address(&self) -> Result<Address>;

    fn message_transmitter_v2_address(&self) -> Result<Address>;

    /// Public endpoints tried in order by the multi-endpoint client.
    fn default_rpc_urls(&self) -> Result<&'static [&'static str]>;
}

fn unknown(chain: &NamedChain) -> CctpError {
    CctpError::UnknownChain {
        chain: chain.to_string(),
    }
}

impl CctpChain for NamedChain {
    fn cctp_domain_id(&self) -> Result<DomainId> {
        use NamedChain::*;

        Ok(match self {
            Mainnet | Sepolia => DomainId::Ethereum,
            Avalanche | AvalancheFuji => DomainId::Avalanche,
            Optimism | OptimismSepolia => DomainId::Optimism,
            Arbitrum | ArbitrumSepolia => DomainId::Arbitrum,
            Base | BaseSepolia => DomainId::Base,
            Polygon | PolygonAmoy => DomainId::Polygon,
            Unichain => DomainId::Unichain,
            Linea => DomainId::Linea,
            _ => return Err(unknown(self)),
        })
    }

    fn usdc_address(&self) -> Result<Address> {
        use NamedChain::*;

        Ok(match self {
            Mainnet => ETHEREUM_USDC,
            Avalanche => AVALANCHE_USDC,
            Base => BASE_USDC,
            Arbitrum => ARBITRUM_USDC,
            Sepolia => ETHEREUM_SEPOLIA_USDC,
            AvalancheFuji => AVALANCHE_FUJI_USDC,
            BaseSepolia => BASE_SEPOLIA_USDC,
            ArbitrumSepolia => ARBITRUM_SEPOLIA_USDC,
            _ => return Err(unknown(self)),
        })
    }

    fn token_messenger_v2_address(&self) -> Result<Address> {
        self.cctp_domain_id()?;
        Ok(if self.is_testnet() {
            CCTP_V2_TOKEN_MESSENGER_TESTNET
        } else {
            CCTP_V2_TOKEN_MESSENGER_MAINNET
        })
    }

    fn message_transmitter_v2_address(&self) -> Result<Address> {
        self.cctp_domain_id()?;
        Ok(if self.is_testnet() {
            CCTP_V2_MESSAGE_TRANSMITTER_TESTNET
        } else {
            CCTP_V2_MESSAGE_TRANSMITTER_MAINNET
        })
    }

    fn default_rpc_urls(&self) -> Result<&'static [&'static str]> {
        use NamedChain::*;

        Ok(match self {
            Mainnet => ETHEREUM_RPC_URLS,
            Avalanche => AVALANCHE_RPC_URLS,
            Base => BASE_RPC_URLS,
            Arbitrum => ARBITRUM_RPC_URLS,
            Sepolia => ETHEREUM_SEPOLIA_RPC_URLS,
            AvalancheFuji => AVALANCHE_FUJI_RPC_URLS,
            BaseSepolia => BASE_SEPOLIA_RPC_URLS,
            ArbitrumSepolia => ARBITRUM_SEPOLIA_RPC_URLS,
            _ => return Err(unknown(self)),
        })
    }
}
