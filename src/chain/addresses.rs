// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Contract addresses and public RPC endpoints for the built-in chain tables.

use alloy_primitives::{address, Address};

// =============================================================================
// CCTP V2 Contract Addresses
// =============================================================================
//
// V2 deploys TokenMessengerV2 and MessageTransmitterV2 at the same address on
// every chain of an environment.
//
// Reference: <https://developers.circle.com/cctp/evm-smart-contracts>

pub const CCTP_V2_MESSAGE_TRANSMITTER_MAINNET: Address =
    address!("81D40F21F12A8F0E3252Bccb954D722d4c464B64");

pub const CCTP_V2_TOKEN_MESSENGER_MAINNET: Address =
    address!("28b5a0e9C621a5BadaA536219b3a228C8168cf5d");

pub const CCTP_V2_MESSAGE_TRANSMITTER_TESTNET: Address =
    address!("E737e5cEBEEBa77EFE34D4aa090756590b1CE275");

pub const CCTP_V2_TOKEN_MESSENGER_TESTNET: Address =
    address!("8FE6B999Dc680CcFDD5Bf7EB0974218be2542DAA");

// =============================================================================
// USDC (burn token) Addresses
// =============================================================================
//
// Reference: <https://developers.circle.com/stablecoins/usdc-contract-addresses>

/// <https://etherscan.io/token/0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48>
pub const ETHEREUM_USDC: Address = address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");

/// <https://snowtrace.io/token/0xB97EF9Ef8734C71904D8002F8b6Bc66Dd9c48a6E>
pub const AVALANCHE_USDC: Address = address!("B97EF9Ef8734C71904D8002F8b6Bc66Dd9c48a6E");

/// <https://basescan.org/token/0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913>
pub const BASE_USDC: Address = address!("833589fCD6eDb6E08f4c7C32D4f71b54bdA02913");

/// <https://arbiscan.io/token/0xaf88d065e77c8cC2239327C5EDb3A432268e5831>
pub const ARBITRUM_USDC: Address = address!("af88d065e77c8cC2239327C5EDb3A432268e5831");

/// <https://sepolia.etherscan.io/token/0x1c7D4B196Cb0C7B01d743Fbc6116a902379C7238>
pub const ETHEREUM_SEPOLIA_USDC: Address = address!("1c7D4B196Cb0C7B01d743Fbc6116a902379C7238");

/// <https://testnet.snowtrace.io/token/0x5425890298aed601595a70AB815c96711a31Bc65>
pub const AVALANCHE_FUJI_USDC: Address = address!("5425890298aed601595a70AB815c96711a31Bc65");

/// <https://sepolia.basescan.org/token/0x036CbD53842c5426634e7929541eC2318f3dCF7e>
pub const BASE_SEPOLIA_USDC: Address = address!("036CbD53842c5426634e7929541eC2318f3dCF7e");

/// <https://sepolia.arbiscan.io/token/0x75faf114eafb1BDbe2F0316DF893fd58CE46AA4d>
pub const ARBITRUM_SEPOLIA_USDC: Address = address!("75faf114eafb1BDbe2F0316DF893fd58CE46AA4d");

// =============================================================================
// Public RPC endpoints, in failover order
// =============================================================================

pub const ETHEREUM_RPC_URLS: &[&str] = &[
    "https://eth.llamarpc.com",
    "https://ethereum-rpc.publicnode.com",
    "https://rpc.ankr.com/eth",
];

pub const AVALANCHE_RPC_URLS: &[&str] = &[
    "https://api.avax.network/ext/bc/C/rpc",
    "https://avalanche-c-chain-rpc.publicnode.com",
];

pub const BASE_RPC_URLS: &[&str] = &["https://mainnet.base.org", "https://base-rpc.publicnode.com"];

pub const ARBITRUM_RPC_URLS: &[&str] = &[
    "https://arb1.arbitrum.io/rpc",
    "https://arbitrum-one-rpc.publicnode.com",
];

pub const ETHEREUM_SEPOLIA_RPC_URLS: &[&str] = &[
    "https://sepolia.drpc.org",
    "https://eth-sepolia.g.alchemy.com/v2/demo",
    "https://rpc.sepolia.org",
    "https://rpc2.sepolia.org",
    "https://ethereum-sepolia.publicnode.com",
];

pub const AVALANCHE_FUJI_RPC_URLS: &[&str] = &[
    "https://avalanche-fuji-c-chain.publicnode.com",
    "https://api.avax-test.network/ext/bc/C/rpc",
    "https://rpc.ankr.com/avalanche_fuji",
];

pub const BASE_SEPOLIA_RPC_URLS: &[&str] = &[
    "https://sepolia.base.org",
    "https://base-sepolia.g.alchemy.com/v2/demo",
];

pub const ARBITRUM_SEPOLIA_RPC_URLS: &[&str] = &[
    "https://sepolia-rollup.arbitrum.io/rpc",
    "https://arbitrum-sepolia-rpc.publicnode.com",
];
